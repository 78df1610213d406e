//! 内存仓储实现
//!
//! 所有仓储共享同一个 Unit of Work 的存储访问句柄

use std::sync::Arc;

use async_trait::async_trait;
use rbac_common::{Pagination, UserId};
use rbac_errors::{AppError, AppResult};
use tokio::sync::{Mutex, OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

use super::state::MemoryState;
use crate::domain::menu::{Menu, MenuId, MenuRepository, RoleMenuRepository};
use crate::domain::query::Sort;
use crate::domain::role::{
    Permission, PermissionFilter, PermissionId, PermissionRepository, PermissionSortField, Role,
    RoleFilter, RoleId, RolePermissionRepository, RoleRepository, RoleSortField,
};
use crate::domain::user::{User, UserFilter, UserRepository, UserRoleRepository, UserSortField};

/// Unit of Work 对存储的访问方式
pub enum StateAccess {
    /// 共享读锁，多个只读 Unit of Work 可以同时持有
    Read(OwnedRwLockReadGuard<MemoryState>),
    /// 独占写锁，第一次写入时才复制出草稿，提交时写回
    Write {
        guard: OwnedRwLockWriteGuard<MemoryState>,
        draft: Option<MemoryState>,
    },
}

impl StateAccess {
    fn current(&self) -> &MemoryState {
        match self {
            StateAccess::Read(guard) => &**guard,
            StateAccess::Write { guard, draft } => draft.as_ref().unwrap_or(&**guard),
        }
    }

    fn draft_mut(&mut self) -> AppResult<&mut MemoryState> {
        match self {
            StateAccess::Read(_) => Err(AppError::internal(
                "Read-only unit of work cannot be written",
            )),
            StateAccess::Write { guard, draft } => {
                Ok(draft.get_or_insert_with(|| (**guard).clone()))
            }
        }
    }
}

/// Unit of Work 内共享的访问句柄，提交或回滚后被取走
pub type SharedState = Arc<Mutex<Option<StateAccess>>>;

fn consumed() -> AppError {
    AppError::internal("Unit of work consumed")
}

async fn read_state<R>(
    state: &SharedState,
    f: impl FnOnce(&MemoryState) -> R + Send,
) -> AppResult<R> {
    let guard = state.lock().await;
    let access = guard.as_ref().ok_or_else(consumed)?;
    Ok(f(access.current()))
}

async fn write_state<R>(
    state: &SharedState,
    f: impl FnOnce(&mut MemoryState) -> AppResult<R> + Send,
) -> AppResult<R> {
    let mut guard = state.lock().await;
    let access = guard.as_mut().ok_or_else(consumed)?;
    f(access.draft_mut()?)
}

macro_rules! define_memory_repo {
    ($name:ident) => {
        pub struct $name {
            state: SharedState,
        }

        impl $name {
            pub fn new(state: SharedState) -> Self {
                Self { state }
            }
        }
    };
}

define_memory_repo!(MemUserRepository);
define_memory_repo!(MemRoleRepository);
define_memory_repo!(MemPermissionRepository);
define_memory_repo!(MemMenuRepository);
define_memory_repo!(MemUserRoleRepository);
define_memory_repo!(MemRolePermissionRepository);
define_memory_repo!(MemRoleMenuRepository);

#[async_trait]
impl UserRepository for MemUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        write_state(&self.state, |s| s.insert_user(user)).await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        write_state(&self.state, |s| s.update_user(user)).await
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.remove_user(id);
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        read_state(&self.state, |s| s.user(id)).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        read_state(&self.state, |s| s.find_user_by_email(email).cloned()).await
    }

    async fn query(
        &self,
        filter: &UserFilter,
        pagination: &Pagination,
        sort: Option<Sort<UserSortField>>,
    ) -> AppResult<(Vec<User>, u64)> {
        read_state(&self.state, |s| s.query_users(filter, pagination, sort)).await
    }
}

#[async_trait]
impl RoleRepository for MemRoleRepository {
    async fn create(&self, role: &Role) -> AppResult<()> {
        write_state(&self.state, |s| s.insert_role(role)).await
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        write_state(&self.state, |s| s.update_role(role)).await
    }

    async fn delete(&self, id: &RoleId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.remove_role(id);
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>> {
        read_state(&self.state, |s| s.role(id)).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        read_state(&self.state, |s| s.find_role_by_name(name).cloned()).await
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        read_state(&self.state, |s| s.roles_by_ids(ids)).await
    }

    async fn query(
        &self,
        filter: &RoleFilter,
        pagination: &Pagination,
        sort: Option<Sort<RoleSortField>>,
    ) -> AppResult<(Vec<Role>, u64)> {
        read_state(&self.state, |s| s.query_roles(filter, pagination, sort)).await
    }

    async fn list_active(&self) -> AppResult<Vec<Role>> {
        read_state(&self.state, |s| s.active_roles()).await
    }
}

#[async_trait]
impl PermissionRepository for MemPermissionRepository {
    async fn create(&self, permission: &Permission) -> AppResult<()> {
        write_state(&self.state, |s| s.insert_permission(permission)).await
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        write_state(&self.state, |s| s.update_permission(permission)).await
    }

    async fn delete(&self, id: &PermissionId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.remove_permission(id);
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &PermissionId) -> AppResult<Option<Permission>> {
        read_state(&self.state, |s| s.permission(id)).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        read_state(&self.state, |s| s.find_permission_by_name(name).cloned()).await
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        read_state(&self.state, |s| s.permissions_by_ids(ids)).await
    }

    async fn query(
        &self,
        filter: &PermissionFilter,
        pagination: &Pagination,
        sort: Option<Sort<PermissionSortField>>,
    ) -> AppResult<(Vec<Permission>, u64)> {
        read_state(&self.state, |s| s.query_permissions(filter, pagination, sort)).await
    }

    async fn list_active(&self) -> AppResult<Vec<Permission>> {
        read_state(&self.state, |s| s.active_permissions()).await
    }
}

#[async_trait]
impl MenuRepository for MemMenuRepository {
    async fn create(&self, menu: &Menu) -> AppResult<()> {
        write_state(&self.state, |s| s.insert_menu(menu)).await
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        write_state(&self.state, |s| s.update_menu(menu)).await
    }

    async fn delete(&self, id: &MenuId) -> AppResult<()> {
        write_state(&self.state, |s| s.remove_menu(id)).await
    }

    async fn find_by_id(&self, id: &MenuId) -> AppResult<Option<Menu>> {
        read_state(&self.state, |s| s.menu(id)).await
    }

    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>> {
        read_state(&self.state, |s| s.menus_by_ids(ids)).await
    }

    async fn find_children(&self, parent_id: &MenuId) -> AppResult<Vec<Menu>> {
        read_state(&self.state, |s| s.children_of(parent_id)).await
    }

    async fn list_active(&self) -> AppResult<Vec<Menu>> {
        read_state(&self.state, |s| s.active_menus()).await
    }

    async fn count_children(&self, parent_id: &MenuId) -> AppResult<u64> {
        read_state(&self.state, |s| s.count_children(parent_id)).await
    }
}

#[async_trait]
impl UserRoleRepository for MemUserRoleRepository {
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        read_state(&self.state, |s| s.roles_of_user(user_id)).await
    }

    async fn replace_user_roles(&self, user_id: &UserId, role_ids: &[RoleId]) -> AppResult<()> {
        write_state(&self.state, |s| s.replace_user_roles(user_id, role_ids)).await
    }

    async fn count_users_with_role(&self, role_id: &RoleId) -> AppResult<u64> {
        read_state(&self.state, |s| s.count_users_with_role(role_id)).await
    }

    async fn clear_user_roles(&self, user_id: &UserId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.clear_user_roles(user_id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RolePermissionRepository for MemRolePermissionRepository {
    async fn find_permissions_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Permission>> {
        read_state(&self.state, |s| s.permissions_of_roles(role_ids)).await
    }

    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<Vec<Permission>> {
        read_state(&self.state, |s| s.permissions_of_role(role_id)).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.replace_role_permissions(role_id, permission_ids)
        })
        .await
    }

    async fn clear_role_permissions(&self, role_id: &RoleId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.clear_role_permissions(role_id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RoleMenuRepository for MemRoleMenuRepository {
    async fn find_menus_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Menu>> {
        read_state(&self.state, |s| s.menus_of_roles(role_ids)).await
    }

    async fn find_role_menus(&self, role_id: &RoleId) -> AppResult<Vec<Menu>> {
        read_state(&self.state, |s| s.menus_of_role(role_id)).await
    }

    async fn replace_role_menus(&self, role_id: &RoleId, menu_ids: &[MenuId]) -> AppResult<()> {
        write_state(&self.state, |s| s.replace_role_menus(role_id, menu_ids)).await
    }

    async fn clear_role_menus(&self, role_id: &RoleId) -> AppResult<()> {
        write_state(&self.state, |s| {
            s.clear_role_menus(role_id);
            Ok(())
        })
        .await
    }
}
