//! 应用层模块

pub mod assignment;
pub mod authorization;
pub mod menu;
pub mod permission;
pub mod role;
pub mod user;
mod validation;

pub use assignment::AssignmentCommandHandler;
pub use authorization::{AuthorizationService, MenuResolver, PermissionResolver};
pub use menu::{MenuCommandHandler, MenuDetails, MenuQueryHandler};
pub use permission::{PermissionCommandHandler, PermissionQueryHandler};
pub use role::{RoleCommandHandler, RoleDetails, RoleQueryHandler};
pub use user::{UserCommandHandler, UserQueryHandler};
