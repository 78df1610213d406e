//! iam-rbac - 基于角色的访问控制核心
//!
//! 用户通过角色获得权限与菜单：
//! - 权限解析与授权检查（`authorize` / `authorize_role`）
//! - 可见菜单解析与菜单树构建
//! - 用户/角色/权限/菜单的管理与关系分配

pub mod application;
pub mod context;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use context::AccessContext;
pub use error::AccessError;
