//! 菜单相关查询定义

use crate::domain::menu::MenuId;
use crate::domain::role::RoleId;

/// 获取菜单详情查询
#[derive(Debug, Clone)]
pub struct GetMenuQuery {
    pub menu_id: MenuId,
}

/// 获取角色集合可见的菜单
///
/// 角色 ID 由调用方提供，不从当前身份推导
#[derive(Debug, Clone, Default)]
pub struct GetUserMenusQuery {
    pub role_ids: Vec<RoleId>,
}
