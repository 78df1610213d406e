//! 基础设施层

pub mod memory;
pub mod persistence;

pub use memory::InMemoryStore;
pub use persistence::PostgresUnitOfWorkFactory;
