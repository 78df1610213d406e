//! PostgreSQL 持久化

mod error_mapper;
mod schema;
mod tx_repositories;
mod unit_of_work;

pub use error_mapper::map_sqlx_error;
pub use schema::migrations;
pub use unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
