//! 角色查询处理器

use std::sync::Arc;

use rbac_common::{PagedResult, Pagination};
use rbac_config::AccessConfig;
use rbac_errors::AppResult;
use serde::Serialize;

use super::queries::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::menu::Menu;
use crate::domain::query::Sort;
use crate::domain::role::{Permission, Role, RoleSortField, RoleSummary};
use crate::error::AccessError;

/// 角色详情，附带其菜单与权限
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetails {
    #[serde(flatten)]
    pub role: Role,
    pub menus: Vec<Menu>,
    pub permissions: Vec<Permission>,
}

/// 角色查询处理器
pub struct RoleQueryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    access: AccessConfig,
}

impl RoleQueryHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, access: AccessConfig) -> Self {
        Self {
            uow_factory,
            access,
        }
    }

    /// 获取角色详情
    pub async fn handle_get(&self, query: GetRoleQuery) -> AppResult<RoleDetails> {
        let uow = self.uow_factory.begin_read_only().await?;

        let role = uow
            .roles()
            .find_by_id(&query.role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;
        let menus = uow.role_menus().find_role_menus(&role.id).await?;
        let permissions = uow.role_permissions().find_role_permissions(&role.id).await?;
        uow.rollback().await?;

        Ok(RoleDetails {
            role,
            menus,
            permissions,
        })
    }

    /// 分页查询角色
    pub async fn handle_query(&self, query: QueryRolesQuery) -> AppResult<PagedResult<Role>> {
        let sort = Sort::<RoleSortField>::parse_opt(query.sort_by.as_deref())?;
        let pagination = Pagination::resolve(
            query.page,
            query.limit,
            self.access.default_page_size,
            self.access.max_page_size,
        );

        let uow = self.uow_factory.begin_read_only().await?;
        let (roles, total) = uow.roles().query(&query.filter, &pagination, sort).await?;
        uow.rollback().await?;

        Ok(PagedResult::new(roles, total, &pagination))
    }

    /// 列出启用的角色（下拉选择用，按名称排序）
    pub async fn handle_list_active(&self) -> AppResult<Vec<RoleSummary>> {
        let uow = self.uow_factory.begin_read_only().await?;
        let roles = uow.roles().list_active().await?;
        uow.rollback().await?;

        Ok(roles.iter().map(RoleSummary::from).collect())
    }
}
