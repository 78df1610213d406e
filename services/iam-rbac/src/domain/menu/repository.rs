//! 菜单仓储接口

use async_trait::async_trait;
use rbac_errors::AppResult;

use super::menu::{Menu, MenuId};
use crate::domain::role::RoleId;

/// 菜单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn create(&self, menu: &Menu) -> AppResult<()>;

    async fn update(&self, menu: &Menu) -> AppResult<()>;

    async fn delete(&self, id: &MenuId) -> AppResult<()>;

    async fn find_by_id(&self, id: &MenuId) -> AppResult<Option<Menu>>;

    /// 根据多个 ID 批量查找菜单
    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>>;

    /// 获取直接子菜单（按 sort 升序）
    async fn find_children(&self, parent_id: &MenuId) -> AppResult<Vec<Menu>>;

    /// 列出所有启用的菜单（按 sort 升序）
    async fn list_active(&self) -> AppResult<Vec<Menu>>;

    /// 统计直接子菜单数量
    async fn count_children(&self, parent_id: &MenuId) -> AppResult<u64>;
}

/// 角色菜单关联仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleMenuRepository: Send + Sync {
    /// 获取多个角色关联的所有菜单（未过滤、未去重）
    async fn find_menus_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Menu>>;

    /// 获取单个角色的菜单
    async fn find_role_menus(&self, role_id: &RoleId) -> AppResult<Vec<Menu>>;

    /// 用新的菜单集合整体替换角色的菜单
    async fn replace_role_menus(&self, role_id: &RoleId, menu_ids: &[MenuId]) -> AppResult<()>;

    /// 清空角色的所有菜单
    async fn clear_role_menus(&self, role_id: &RoleId) -> AppResult<()>;
}
