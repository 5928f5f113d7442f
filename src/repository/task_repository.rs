use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::dialect::Dialect;
use super::{RepositoryError, RepositoryResult, TaskRepository};
use crate::db::{with_pool, Database};
use crate::models::task::{Task, TaskStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Task statements for one dialect, built once per repository.
#[derive(Debug, Clone)]
pub struct TaskQueries {
    pub insert: String,
    pub select_all: String,
    pub select_by_id: String,
    pub select_by_owner: String,
    pub update: String,
    pub delete: String,
}

impl TaskQueries {
    pub fn new(dialect: Dialect) -> Self {
        let p = |n| dialect.placeholder(n);
        let columns = format!(
            "id, title, description, {} AS due_date, status, owner_id, created_at, updated_at",
            dialect.date_column("due_date")
        );
        let order_by = format!(
            "ORDER BY CASE status WHEN 'Done' THEN 1 ELSE 0 END ASC, {}, created_at DESC",
            dialect.asc_nulls_last("tasks.due_date")
        );

        TaskQueries {
            insert: format!(
                "INSERT INTO tasks (title, description, due_date, status, owner_id, created_at, updated_at) \
                 VALUES ({}, {}, {}){}",
                dialect.placeholders(1, 2),
                dialect.date_param(3),
                dialect.placeholders(4, 7),
                dialect.returning_id(),
            ),
            select_all: format!("SELECT {} FROM tasks {}", columns, order_by),
            select_by_id: format!("SELECT {} FROM tasks WHERE id = {}", columns, p(1)),
            select_by_owner: format!(
                "SELECT {} FROM tasks WHERE owner_id = {} {}",
                columns,
                p(1),
                order_by
            ),
            update: format!(
                "UPDATE tasks SET title = {}, description = {}, due_date = {}, status = {}, \
                 owner_id = {}, updated_at = {} WHERE id = {}",
                p(1),
                p(2),
                dialect.date_param(3),
                p(4),
                p(5),
                p(6),
                p(7),
            ),
            delete: format!("DELETE FROM tasks WHERE id = {}", p(1)),
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    due_date: Option<String>,
    status: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status: TaskStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::CorruptRow(format!("task {}: {}", row.id, e)))?;
        let due_date = row
            .due_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()
            .map_err(|e| RepositoryError::CorruptRow(format!("task {} due_date: {}", row.id, e)))?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date,
            status,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> RepositoryResult<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

fn format_due_date(due_date: Option<NaiveDate>) -> Option<String> {
    due_date.map(|d| d.format(DATE_FORMAT).to_string())
}

pub struct SqlTaskRepository {
    db: Database,
    queries: TaskQueries,
}

impl SqlTaskRepository {
    pub fn new(db: Database) -> Self {
        let queries = TaskQueries::new(db.dialect());
        SqlTaskRepository { db, queries }
    }
}

#[async_trait]
impl TaskRepository for SqlTaskRepository {
    async fn create(&self, task: &mut Task) -> RepositoryResult<()> {
        let now = Utc::now();
        let due_date = format_due_date(task.due_date);
        let status = task.status.as_str();

        let id = match &self.db {
            Database::MySql(pool) => {
                let result = sqlx::query(&self.queries.insert)
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(&due_date)
                    .bind(status)
                    .bind(task.owner_id)
                    .bind(now)
                    .bind(now)
                    .execute(pool)
                    .await?;
                i64::try_from(result.last_insert_id()).map_err(|_| {
                    RepositoryError::CorruptRow(format!(
                        "generated task id {} out of range",
                        result.last_insert_id()
                    ))
                })?
            }
            Database::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(&self.queries.insert)
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(&due_date)
                    .bind(status)
                    .bind(task.owner_id)
                    .bind(now)
                    .bind(now)
                    .fetch_one(pool)
                    .await?
            }
        };

        task.id = id;
        task.created_at = now;
        task.updated_at = now;
        Ok(())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Task>> {
        let rows = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, TaskRow>(&self.queries.select_all)
                .fetch_all(pool)
                .await?
        });
        into_tasks(rows)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Task>> {
        let row = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, TaskRow>(&self.queries.select_by_id)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });
        row.map(Task::try_from).transpose()
    }

    async fn get_by_owner_id(&self, owner_id: i64) -> RepositoryResult<Vec<Task>> {
        let rows = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, TaskRow>(&self.queries.select_by_owner)
                .bind(owner_id)
                .fetch_all(pool)
                .await?
        });
        into_tasks(rows)
    }

    async fn update(&self, task: &mut Task) -> RepositoryResult<()> {
        let now = Utc::now();
        let due_date = format_due_date(task.due_date);
        let status = task.status.as_str();

        with_pool!(&self.db, pool => {
            sqlx::query(&self.queries.update)
                .bind(&task.title)
                .bind(&task.description)
                .bind(&due_date)
                .bind(status)
                .bind(task.owner_id)
                .bind(now)
                .bind(task.id)
                .execute(pool)
                .await
                .map(|_| ())
        })?;

        task.updated_at = now;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        with_pool!(&self.db, pool => {
            sqlx::query(&self.queries.delete)
                .bind(id)
                .execute(pool)
                .await?;
        });
        Ok(())
    }
}
