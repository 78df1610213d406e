//! 领域层

pub mod access;
pub mod menu;
pub mod query;
pub mod role;
pub mod unit_of_work;
pub mod user;

pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
