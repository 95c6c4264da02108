// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, storage and start HTTP server

mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use errors::PlacesError;
use services::{BlobStorage, SubmissionLimiter};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting panorama-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool (runs migrations when enabled)
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Shared state: file storage and per-user submission limiter
    let storage = web::Data::new(BlobStorage::new(
        &config.storage_root,
        &config.storage_public_prefix,
    ));
    log::info!("Image storage rooted at {}", config.storage_root);

    let limiter = web::Data::new(SubmissionLimiter::per_minute(config.submissions_per_minute));
    log::info!(
        "Submission limit: {} per user per minute",
        config.submissions_per_minute
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let pool = web::Data::new(pool);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let max_upload_bytes = config.max_upload_bytes;

        App::new()
            // Application state
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(storage.clone())
            .app_data(limiter.clone())
            // Extractor limits and error bodies
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                PlacesError::InvalidInput(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                PlacesError::InvalidInput(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                PlacesError::NotFound(err.to_string()).into()
            }))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::ratings_config)
            .configure(handlers::reviews_config)
            .configure(handlers::admin_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
