use std::time::Duration;

use actix_web::web;
use diesel::{r2d2::ConnectionManager, MysqlConnection};

use crate::{config::Config, AppState};

/// State whose pool never connects. Good for requests rejected before any query.
pub fn test_state() -> web::Data<AppState> {
    let manager = ConnectionManager::<MysqlConnection>::new("mysql://invalid");
    let pool = r2d2::Pool::builder()
        .min_idle(Some(0))
        .max_size(1)
        .connection_timeout(Duration::from_millis(200))
        .build_unchecked(manager);

    web::Data::new(AppState {
        pool,
        config: Config::default(),
    })
}
