//! 用户仓储接口

use async_trait::async_trait;
use rbac_common::{Pagination, UserId};
use rbac_errors::AppResult;

use super::user::User;
use crate::domain::query::{Sort, SortField};
use crate::domain::role::{Role, RoleId};

/// 用户查询过滤条件（精确匹配）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// 用户可排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

impl SortField for UserSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> AppResult<()>;

    async fn update(&self, user: &User) -> AppResult<()>;

    async fn delete(&self, id: &UserId) -> AppResult<()>;

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// 分页查询用户
    async fn query(
        &self,
        filter: &UserFilter,
        pagination: &Pagination,
        sort: Option<Sort<UserSortField>>,
    ) -> AppResult<(Vec<User>, u64)>;
}

/// 用户角色关联仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// 获取用户持有的角色
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>>;

    /// 用新的角色集合整体替换用户的角色
    async fn replace_user_roles(&self, user_id: &UserId, role_ids: &[RoleId]) -> AppResult<()>;

    /// 统计持有某角色的用户数
    async fn count_users_with_role(&self, role_id: &RoleId) -> AppResult<u64>;

    /// 清空用户的所有角色
    async fn clear_user_roles(&self, user_id: &UserId) -> AppResult<()>;
}
