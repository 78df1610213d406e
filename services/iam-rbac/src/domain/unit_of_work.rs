//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力，确保“检查后修改”序列的原子性。
//! 未提交就被丢弃的 Unit of Work 等同于回滚。

use async_trait::async_trait;
use rbac_errors::AppResult;

use crate::domain::menu::{MenuRepository, RoleMenuRepository};
use crate::domain::role::{PermissionRepository, RolePermissionRepository, RoleRepository};
use crate::domain::user::{UserRepository, UserRoleRepository};

/// Unit of Work trait
///
/// 协调多个 Repository 在同一事务中的操作。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 获取用户 Repository
    fn users(&self) -> &dyn UserRepository;

    /// 获取角色 Repository
    fn roles(&self) -> &dyn RoleRepository;

    /// 获取权限 Repository
    fn permissions(&self) -> &dyn PermissionRepository;

    /// 获取菜单 Repository
    fn menus(&self) -> &dyn MenuRepository;

    /// 获取用户角色 Repository
    fn user_roles(&self) -> &dyn UserRoleRepository;

    /// 获取角色权限 Repository
    fn role_permissions(&self) -> &dyn RolePermissionRepository;

    /// 获取角色菜单 Repository
    fn role_menus(&self) -> &dyn RoleMenuRepository;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// 开始只读事务，只读事务之间互不阻塞，写入会被拒绝
    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
