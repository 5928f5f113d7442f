//! SQL text that differs between the two supported engines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Bind parameter number `n` (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${}", n),
        }
    }

    /// Bind parameter `n` converted from a `YYYY-MM-DD` string to a DATE.
    pub fn date_param(&self, n: usize) -> String {
        match self {
            Dialect::MySql => "STR_TO_DATE(?, '%Y-%m-%d')".to_string(),
            Dialect::Postgres => format!("${}::date", n),
        }
    }

    /// DATE column rendered as a `YYYY-MM-DD` string.
    pub fn date_column(&self, column: &str) -> String {
        match self {
            Dialect::MySql => format!("DATE_FORMAT({}, '%Y-%m-%d')", column),
            Dialect::Postgres => format!("TO_CHAR({}, 'YYYY-MM-DD')", column),
        }
    }

    /// Ascending sort key with NULLs after every value.
    pub fn asc_nulls_last(&self, column: &str) -> String {
        match self {
            Dialect::MySql => format!("{0} IS NULL ASC, {0} ASC", column),
            Dialect::Postgres => format!("{} ASC NULLS LAST", column),
        }
    }

    /// Suffix that makes an INSERT yield the generated id as a row.
    pub fn returning_id(&self) -> &'static str {
        match self {
            Dialect::MySql => "",
            Dialect::Postgres => " RETURNING id",
        }
    }

    /// Comma-separated placeholders `from..=to`.
    pub fn placeholders(&self, from: usize, to: usize) -> String {
        (from..=to)
            .map(|n| self.placeholder(n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
