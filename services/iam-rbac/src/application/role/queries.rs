//! 角色相关查询定义

use crate::domain::role::{RoleFilter, RoleId};

/// 获取角色详情查询
#[derive(Debug, Clone)]
pub struct GetRoleQuery {
    pub role_id: RoleId,
}

/// 分页查询角色
#[derive(Debug, Clone, Default)]
pub struct QueryRolesQuery {
    pub filter: RoleFilter,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// `field:asc` 或 `field:desc`
    pub sort_by: Option<String>,
}
