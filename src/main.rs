use std::io;
use std::sync::Arc;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use todo_api::config::Config;
use todo_api::db::Database;
use todo_api::repository::{
    MemoryTaskRepository, MemoryUserRepository, SqlTaskRepository, SqlUserRepository,
    TaskRepository, UserRepository,
};
use todo_api::routes::cors::{cors, CorsConfig};
use todo_api::routes::routes::api_configure;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let database = match &config.database {
        Some(db_config) => Some(Database::connect(db_config).await.map_err(|e| {
            error!("Failed to connect to database: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e)
        })?),
        None => None,
    };

    let (tasks, users): (Arc<dyn TaskRepository>, Arc<dyn UserRepository>) = match &database {
        Some(db) => (
            Arc::new(SqlTaskRepository::new(db.clone())),
            Arc::new(SqlUserRepository::new(db.clone())),
        ),
        None => {
            info!("Using in-memory storage");
            (
                Arc::new(MemoryTaskRepository::new()),
                Arc::new(MemoryUserRepository::new()),
            )
        }
    };
    let cors_config = web::Data::new(CorsConfig::new(config.cors_origins.clone()));

    let server_address = ("0.0.0.0", config.port);
    info!("Server running at http://{}:{}", server_address.0, server_address.1);

    HttpServer::new(move || {
        App::new()
            .app_data(cors_config.clone())
            .wrap(from_fn(cors))
            .wrap(Logger::default())
            .configure(api_configure(tasks.clone(), users.clone()))
    })
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind(server_address)?
    .run()
    .await?;

    if let Some(db) = database {
        info!("Closing database connections");
        db.close().await;
    }
    info!("Server stopped");
    Ok(())
}
