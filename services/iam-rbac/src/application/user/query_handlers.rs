//! 用户查询处理器

use std::sync::Arc;

use rbac_common::{PagedResult, Pagination};
use rbac_config::AccessConfig;
use rbac_errors::AppResult;

use super::queries::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::query::Sort;
use crate::domain::role::Role;
use crate::domain::user::{User, UserSortField};
use crate::error::AccessError;

/// 用户查询处理器
pub struct UserQueryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    access: AccessConfig,
}

impl UserQueryHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, access: AccessConfig) -> Self {
        Self {
            uow_factory,
            access,
        }
    }

    pub async fn handle_get(&self, query: GetUserQuery) -> AppResult<User> {
        let uow = self.uow_factory.begin_read_only().await?;
        let user = uow
            .users()
            .find_by_id(&query.user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;
        uow.rollback().await?;

        Ok(user)
    }

    /// 分页查询用户
    pub async fn handle_query(&self, query: QueryUsersQuery) -> AppResult<PagedResult<User>> {
        let sort = Sort::<UserSortField>::parse_opt(query.sort_by.as_deref())?;
        let pagination = Pagination::resolve(
            query.page,
            query.limit,
            self.access.default_page_size,
            self.access.max_page_size,
        );

        let uow = self.uow_factory.begin_read_only().await?;
        let (users, total) = uow.users().query(&query.filter, &pagination, sort).await?;
        uow.rollback().await?;

        Ok(PagedResult::new(users, total, &pagination))
    }

    /// 获取用户持有的角色
    pub async fn handle_get_user_roles(&self, query: GetUserRolesQuery) -> AppResult<Vec<Role>> {
        let uow = self.uow_factory.begin_read_only().await?;

        uow.users()
            .find_by_id(&query.user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;
        let roles = uow.user_roles().find_roles_by_user(&query.user_id).await?;
        uow.rollback().await?;

        Ok(roles)
    }
}
