//! 权限查询处理器

use std::sync::Arc;

use rbac_common::{PagedResult, Pagination};
use rbac_config::AccessConfig;
use rbac_errors::AppResult;

use super::queries::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::query::Sort;
use crate::domain::role::{Permission, PermissionSortField};
use crate::error::AccessError;

/// 权限查询处理器
pub struct PermissionQueryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    access: AccessConfig,
}

impl PermissionQueryHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, access: AccessConfig) -> Self {
        Self {
            uow_factory,
            access,
        }
    }

    pub async fn handle_get(&self, query: GetPermissionQuery) -> AppResult<Permission> {
        let uow = self.uow_factory.begin_read_only().await?;
        let permission = uow
            .permissions()
            .find_by_id(&query.permission_id)
            .await?
            .ok_or(AccessError::PermissionNotFound)?;
        uow.rollback().await?;

        Ok(permission)
    }

    /// 分页查询权限
    pub async fn handle_query(
        &self,
        query: QueryPermissionsQuery,
    ) -> AppResult<PagedResult<Permission>> {
        let sort = Sort::<PermissionSortField>::parse_opt(query.sort_by.as_deref())?;
        let pagination = Pagination::resolve(
            query.page,
            query.limit,
            self.access.default_page_size,
            self.access.max_page_size,
        );

        let uow = self.uow_factory.begin_read_only().await?;
        let (permissions, total) = uow
            .permissions()
            .query(&query.filter, &pagination, sort)
            .await?;
        uow.rollback().await?;

        Ok(PagedResult::new(permissions, total, &pagination))
    }

    /// 列出启用的权限（按分类、名称排序）
    pub async fn handle_list_active(&self) -> AppResult<Vec<Permission>> {
        let uow = self.uow_factory.begin_read_only().await?;
        let permissions = uow.permissions().list_active().await?;
        uow.rollback().await?;

        Ok(permissions)
    }
}
