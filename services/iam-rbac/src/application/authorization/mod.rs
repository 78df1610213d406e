//! 授权应用层模块

pub mod resolver;
pub mod service;

pub use resolver::{MenuResolver, PermissionResolver};
pub use service::AuthorizationService;
