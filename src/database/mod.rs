pub mod assert;

use crate::AppState;
use actix_web::web;
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;

pub type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

pub fn get_db_conn(state: &web::Data<AppState>) -> anyhow::Result<DbConn> {
    state.pool.get().context("DB connection")
}

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

/// Id of the row inserted last on this connection.
pub fn get_last_insert_id(conn: &MysqlConnection) -> diesel::QueryResult<u64> {
    use diesel::prelude::*;

    diesel::select(last_insert_id).get_result::<u64>(conn)
}
