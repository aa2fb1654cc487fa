mod driver;
mod mysql;
mod postgres;

pub use driver::DatabaseDriver;
pub use mysql::MysqlDriver;
pub use postgres::PostgresDriver;

use crate::config::{ConnectionSettings, DatabaseEngine};
use crate::error::Result;
pub fn create_driver(
    engine: DatabaseEngine,
    connection: &ConnectionSettings,
) -> Result<Box<dyn DatabaseDriver>> {
    match engine {
        DatabaseEngine::Postgres => {
            let driver = PostgresDriver::new(connection)?;
            Ok(Box::new(driver))
        }
        DatabaseEngine::MySQL => {
            let driver = MysqlDriver::new(connection)?;
            Ok(Box::new(driver))
        }
    }
}
