//! 用户相关查询定义

use rbac_common::UserId;

use crate::domain::user::UserFilter;

/// 获取用户详情查询
#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub user_id: UserId,
}

/// 分页查询用户
#[derive(Debug, Clone, Default)]
pub struct QueryUsersQuery {
    pub filter: UserFilter,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}

/// 获取用户角色查询
#[derive(Debug, Clone)]
pub struct GetUserRolesQuery {
    pub user_id: UserId,
}
