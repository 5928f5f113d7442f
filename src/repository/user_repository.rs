use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::dialect::Dialect;
use super::{RepositoryError, RepositoryResult, UserRepository};
use crate::db::{with_pool, Database};
use crate::models::user::User;

const COLUMNS: &str = "id, username, email, first_name, last_name, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserQueries {
    pub insert: String,
    pub select_all: String,
    pub select_by_id: String,
    pub select_by_username: String,
    pub update: String,
    pub delete: String,
}

impl UserQueries {
    pub fn new(dialect: Dialect) -> Self {
        let p = |n| dialect.placeholder(n);
        UserQueries {
            insert: format!(
                "INSERT INTO users (username, email, first_name, last_name, created_at, updated_at) \
                 VALUES ({}){}",
                dialect.placeholders(1, 6),
                dialect.returning_id(),
            ),
            select_all: format!("SELECT {} FROM users ORDER BY id ASC", COLUMNS),
            select_by_id: format!("SELECT {} FROM users WHERE id = {}", COLUMNS, p(1)),
            select_by_username: format!("SELECT {} FROM users WHERE username = {}", COLUMNS, p(1)),
            update: format!(
                "UPDATE users SET username = {}, email = {}, first_name = {}, last_name = {}, \
                 updated_at = {} WHERE id = {}",
                p(1),
                p(2),
                p(3),
                p(4),
                p(5),
                p(6),
            ),
            delete: format!("DELETE FROM users WHERE id = {}", p(1)),
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct SqlUserRepository {
    db: Database,
    queries: UserQueries,
}

impl SqlUserRepository {
    pub fn new(db: Database) -> Self {
        let queries = UserQueries::new(db.dialect());
        SqlUserRepository { db, queries }
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: &mut User) -> RepositoryResult<()> {
        let now = Utc::now();

        let id = match &self.db {
            Database::MySql(pool) => {
                let result = sqlx::query(&self.queries.insert)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.first_name)
                    .bind(&user.last_name)
                    .bind(now)
                    .bind(now)
                    .execute(pool)
                    .await?;
                i64::try_from(result.last_insert_id()).map_err(|_| {
                    RepositoryError::CorruptRow(format!(
                        "generated user id {} out of range",
                        result.last_insert_id()
                    ))
                })?
            }
            Database::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(&self.queries.insert)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.first_name)
                    .bind(&user.last_name)
                    .bind(now)
                    .bind(now)
                    .fetch_one(pool)
                    .await?
            }
        };

        user.id = id;
        user.created_at = now;
        user.updated_at = now;
        Ok(())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        let rows = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, UserRow>(&self.queries.select_all)
                .fetch_all(pool)
                .await?
        });
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let row = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, UserRow>(&self.queries.select_by_id)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });
        Ok(row.map(User::from))
    }

    async fn get_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, UserRow>(&self.queries.select_by_username)
                .bind(username)
                .fetch_optional(pool)
                .await?
        });
        Ok(row.map(User::from))
    }

    async fn update(&self, user: &mut User) -> RepositoryResult<()> {
        let now = Utc::now();
        with_pool!(&self.db, pool => {
            sqlx::query(&self.queries.update)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(now)
                .bind(user.id)
                .execute(pool)
                .await?;
        });
        user.updated_at = now;
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
