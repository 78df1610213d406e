//! 角色、权限仓储接口

use async_trait::async_trait;
use rbac_common::Pagination;
use rbac_errors::AppResult;

use super::permission::{Permission, PermissionId};
use super::role::{Role, RoleId};
use crate::domain::query::{Sort, SortField};

/// 角色查询过滤条件（精确匹配）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFilter {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// 角色可排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSortField {
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortField for RoleSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "isActive" => Some(Self::IsActive),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::IsActive => "is_active",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// 权限查询过滤条件（精确匹配）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionFilter {
    pub name: Option<String>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

/// 权限可排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSortField {
    Name,
    Action,
    Resource,
    Category,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortField for PermissionSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "action" => Some(Self::Action),
            "resource" => Some(Self::Resource),
            "category" => Some(Self::Category),
            "isActive" => Some(Self::IsActive),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Action => "action",
            Self::Resource => "resource",
            Self::Category => "category",
            Self::IsActive => "is_active",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// 角色仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// 创建角色
    async fn create(&self, role: &Role) -> AppResult<()>;

    /// 更新角色
    async fn update(&self, role: &Role) -> AppResult<()>;

    /// 删除角色
    async fn delete(&self, id: &RoleId) -> AppResult<()>;

    /// 根据 ID 查找角色
    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>>;

    /// 根据名称查找角色
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// 根据多个 ID 批量查找角色，不存在的 ID 被忽略
    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// 分页查询角色，返回结果与总数
    async fn query(
        &self,
        filter: &RoleFilter,
        pagination: &Pagination,
        sort: Option<Sort<RoleSortField>>,
    ) -> AppResult<(Vec<Role>, u64)>;

    /// 列出所有启用的角色（按名称排序）
    async fn list_active(&self) -> AppResult<Vec<Role>>;
}

/// 权限仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// 创建权限
    async fn create(&self, permission: &Permission) -> AppResult<()>;

    /// 更新权限
    async fn update(&self, permission: &Permission) -> AppResult<()>;

    /// 删除权限
    async fn delete(&self, id: &PermissionId) -> AppResult<()>;

    /// 根据 ID 查找权限
    async fn find_by_id(&self, id: &PermissionId) -> AppResult<Option<Permission>>;

    /// 根据名称查找权限
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// 根据多个 ID 批量查找权限
    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>>;

    /// 分页查询权限
    async fn query(
        &self,
        filter: &PermissionFilter,
        pagination: &Pagination,
        sort: Option<Sort<PermissionSortField>>,
    ) -> AppResult<(Vec<Permission>, u64)>;

    /// 列出所有启用的权限（按分类、名称排序）
    async fn list_active(&self) -> AppResult<Vec<Permission>>;
}

/// 角色权限关联仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// 获取多个角色关联的所有权限（可能包含重复与停用的权限）
    async fn find_permissions_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Permission>>;

    /// 获取单个角色的权限
    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<Vec<Permission>>;

    /// 用新的权限集合整体替换角色的权限
    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// 清空角色的所有权限
    async fn clear_role_permissions(&self, role_id: &RoleId) -> AppResult<()>;
}
