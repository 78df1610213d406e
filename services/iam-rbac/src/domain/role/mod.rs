//! RBAC 角色权限领域模块

#![allow(clippy::module_inception)]

pub mod permission;
pub mod repository;
pub mod role;

pub use permission::{
    PERMISSION_ACTION_MAX_LEN, PERMISSION_CATEGORY_MAX_LEN, PERMISSION_DESCRIPTION_MAX_LEN,
    PERMISSION_NAME_MAX_LEN, PERMISSION_RESOURCE_MAX_LEN, Permission, PermissionId,
};
pub use repository::{
    PermissionFilter, PermissionRepository, PermissionSortField, RoleFilter, RolePermissionRepository,
    RoleRepository, RoleSortField,
};
#[cfg(test)]
pub use repository::{MockPermissionRepository, MockRolePermissionRepository, MockRoleRepository};
pub use role::{ROLE_NAME_MAX_LEN, Role, RoleId, RoleSummary};
