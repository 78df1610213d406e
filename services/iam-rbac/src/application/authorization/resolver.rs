//! 权限与菜单解析
//!
//! 未知的角色 ID 不会报错，只是不贡献任何权限或菜单；
//! 角色是否存在由分配管理负责校验

use std::collections::HashSet;

use rbac_errors::AppResult;

use crate::domain::access::PermissionSet;
use crate::domain::menu::{Menu, RoleMenuRepository};
use crate::domain::role::{RoleId, RolePermissionRepository};

/// 权限解析器
pub struct PermissionResolver;

impl PermissionResolver {
    /// 计算角色集合授予的启用权限并集
    ///
    /// 输入为空时直接返回空集，不访问存储
    pub async fn resolve(
        repo: &dyn RolePermissionRepository,
        role_ids: &[RoleId],
    ) -> AppResult<PermissionSet> {
        if role_ids.is_empty() {
            return Ok(PermissionSet::empty());
        }

        let granted = repo.find_permissions_by_roles(role_ids).await?;
        Ok(PermissionSet::from_granted(granted))
    }
}

/// 菜单解析器
pub struct MenuResolver;

impl MenuResolver {
    /// 计算角色集合可见的菜单
    ///
    /// 只保留启用且可见的菜单，按 ID 去重，按 `sort` 升序（相同时按 ID）排列
    pub async fn resolve_visible(
        repo: &dyn RoleMenuRepository,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Menu>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let granted = repo.find_menus_by_roles(role_ids).await?;

        let mut seen = HashSet::new();
        let mut menus: Vec<Menu> = granted
            .into_iter()
            .filter(|m| m.is_displayable())
            .filter(|m| seen.insert(m.id.clone()))
            .collect();
        menus.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.id.cmp(&b.id)));

        Ok(menus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::{MenuId, MockRoleMenuRepository};
    use crate::domain::role::{MockRolePermissionRepository, Permission, PermissionId};

    fn permission(id: &str, action: &str, resource: &str) -> Permission {
        Permission::new(id.to_string(), action.to_string(), resource.to_string())
            .with_id(PermissionId::from(id))
    }

    fn menu(id: &str, sort: i32) -> Menu {
        Menu::new(id.to_string())
            .with_id(MenuId::from(id))
            .with_sort(sort)
    }

    #[tokio::test]
    async fn test_empty_roles_skip_store() {
        let mut permissions = MockRolePermissionRepository::new();
        permissions.expect_find_permissions_by_roles().never();
        let mut menus = MockRoleMenuRepository::new();
        menus.expect_find_menus_by_roles().never();

        let resolved = PermissionResolver::resolve(&permissions, &[]).await.unwrap();
        assert!(resolved.is_empty());

        let visible = MenuResolver::resolve_visible(&menus, &[]).await.unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_filters_inactive_and_dedupes() {
        let mut repo = MockRolePermissionRepository::new();
        repo.expect_find_permissions_by_roles()
            .times(1)
            .returning(|_| {
                let mut inactive = permission("p3", "delete", "user");
                inactive.deactivate();
                Ok(vec![
                    permission("p1", "read", "user"),
                    permission("p1", "read", "user"),
                    permission("p2", "write", "user"),
                    inactive,
                ])
            });

        let resolved = PermissionResolver::resolve(&repo, &[RoleId::from("r1"), RoleId::from("r2")])
            .await
            .unwrap();

        assert_eq!(
            resolved.ids(),
            vec![PermissionId::from("p1"), PermissionId::from("p2")]
        );
    }

    #[tokio::test]
    async fn test_resolve_visible_filters_and_orders_by_sort() {
        let mut repo = MockRoleMenuRepository::new();
        repo.expect_find_menus_by_roles()
            .withf(|ids: &[RoleId]| ids.len() == 1)
            .returning(|_| {
                Ok(vec![
                    menu("settings", 30),
                    menu("hidden", 5).hidden(),
                    menu("dashboard", 10),
                    menu("archived", 1).inactive(),
                    menu("settings", 30),
                    menu("users", 20),
                ])
            });

        let visible = MenuResolver::resolve_visible(&repo, &[RoleId::from("r1")])
            .await
            .unwrap();

        let ids: Vec<&str> = visible.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["dashboard", "users", "settings"]);
    }

    #[tokio::test]
    async fn test_store_error_is_propagated() {
        let mut repo = MockRolePermissionRepository::new();
        repo.expect_find_permissions_by_roles()
            .returning(|_| Err(rbac_errors::AppError::database("connection reset")));

        let result = PermissionResolver::resolve(&repo, &[RoleId::from("r1")]).await;
        assert!(matches!(result, Err(rbac_errors::AppError::Database(_))));
    }
}
