#[macro_use]
extern crate diesel;

mod admin;
mod analytics;
mod auth;
mod booking;
mod config;
mod customer;
mod database;
mod error;
mod models;
mod nutritionist;
mod protocol;
mod schema;
#[cfg(test)]
mod test_utils;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let manager = ConnectionManager::<MysqlConnection>::new(config.database_url.as_str());
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .build(manager)
        .context("Failed to create pool")?;

    let bind = config.bind_address.clone();
    let state = web::Data::new(AppState { pool, config });

    tracing::info!(%bind, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // sign-up, login and passwords
            .service(web::scope("/auth").configure(auth::config))
            // customer
            .service(web::scope("/customer").configure(customer::config))
            // nutritionist
            .service(web::scope("/nutritionist").configure(nutritionist::config))
            // administrator
            .service(web::scope("/admin").configure(admin::config))
    })
    .bind(&bind)?
    .run()
    .await?;

    Ok(())
}
