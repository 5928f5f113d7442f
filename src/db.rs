use log::info;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{MySqlPool, PgPool};

use crate::config::DatabaseConfig;
use crate::repository::dialect::Dialect;

/// Connection pool for whichever engine the service was configured with.
#[derive(Debug, Clone)]
pub enum Database {
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!(
            "Connecting to {:?} database {} at {}:{}",
            config.dialect, config.name, config.host, config.port
        );
        match config.dialect {
            Dialect::MySql => {
                let options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.name);
                let pool = MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(options)
                    .await?;
                Ok(Database::MySql(pool))
            }
            Dialect::Postgres => {
                let options = PgConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.name);
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(options)
                    .await?;
                Ok(Database::Postgres(pool))
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Database::MySql(_) => Dialect::MySql,
            Database::Postgres(_) => Dialect::Postgres,
        }
    }

    pub async fn close(&self) {
        match self {
            Database::MySql(pool) => pool.close().await,
            Database::Postgres(pool) => pool.close().await,
        }
    }
}

/// Runs the same sqlx expression against whichever pool `$db` holds.
macro_rules! with_pool {
    ($db:expr, $pool:ident => $body:expr) => {
        match $db {
            $crate::db::Database::MySql($pool) => $body,
            $crate::db::Database::Postgres($pool) => $body,
        }
    };
}

pub(crate) use with_pool;
