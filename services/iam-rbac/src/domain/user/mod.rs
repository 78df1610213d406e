//! 用户领域模块

#![allow(clippy::module_inception)]

pub mod repository;
pub mod user;

pub use repository::{UserFilter, UserRepository, UserRoleRepository, UserSortField};
#[cfg(test)]
pub use repository::{MockUserRepository, MockUserRoleRepository};
pub use user::{USER_NAME_MAX_LEN, User, is_valid_email};
