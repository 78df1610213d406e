//! 权限相关查询定义

use crate::domain::role::{PermissionFilter, PermissionId};

/// 获取权限详情查询
#[derive(Debug, Clone)]
pub struct GetPermissionQuery {
    pub permission_id: PermissionId,
}

/// 分页查询权限
#[derive(Debug, Clone, Default)]
pub struct QueryPermissionsQuery {
    pub filter: PermissionFilter,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}
