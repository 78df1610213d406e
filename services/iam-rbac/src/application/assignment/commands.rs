//! 关系分配命令定义
//!
//! 每次分配都用新集合整体替换旧集合

use rbac_common::UserId;

use crate::domain::menu::MenuId;
use crate::domain::role::{PermissionId, RoleId};

/// 设置用户角色命令
#[derive(Debug, Clone)]
pub struct SetUserRolesCommand {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
}

/// 设置角色菜单命令
#[derive(Debug, Clone)]
pub struct SetRoleMenusCommand {
    pub role_id: RoleId,
    pub menu_ids: Vec<MenuId>,
}

/// 设置角色权限命令
#[derive(Debug, Clone)]
pub struct SetRolePermissionsCommand {
    pub role_id: RoleId,
    pub permission_ids: Vec<PermissionId>,
}

/// 删除角色命令
#[derive(Debug, Clone)]
pub struct DeleteRoleCommand {
    pub role_id: RoleId,
}

/// 删除菜单命令
#[derive(Debug, Clone)]
pub struct DeleteMenuCommand {
    pub menu_id: MenuId,
}

/// 去重并保持原有顺序
pub(crate) fn dedup_ids<T: Clone + Eq + std::hash::Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        let ids = vec![RoleId::from("r2"), RoleId::from("r1"), RoleId::from("r2")];
        assert_eq!(dedup_ids(&ids), vec![RoleId::from("r2"), RoleId::from("r1")]);
    }
}
