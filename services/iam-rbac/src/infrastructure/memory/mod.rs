//! 内存存储
//!
//! 用于测试与未配置数据库时运行，约束行为与 PostgreSQL 实现保持一致

mod repositories;
mod state;
mod unit_of_work;

pub use unit_of_work::{InMemoryStore, InMemoryUnitOfWork};
