//! 内存存储的数据快照
//!
//! 约束与 PostgreSQL schema 保持一致：名称与邮箱唯一、外键存在、
//! 删除实体时级联删除关联、有子菜单的菜单不能删除

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use rbac_common::{Pagination, SortDirection, UserId};
use rbac_errors::{AppError, AppResult};

use crate::domain::menu::{Menu, MenuId};
use crate::domain::query::Sort;
use crate::domain::role::{
    Permission, PermissionFilter, PermissionId, PermissionSortField, Role, RoleFilter, RoleId,
    RoleSortField,
};
use crate::domain::user::{User, UserFilter, UserSortField};

fn unique_violation() -> AppError {
    AppError::conflict("Duplicate entry violates unique constraint")
}

fn foreign_key_violation() -> AppError {
    AppError::bad_request("Foreign key constraint violation")
}

fn record_not_found() -> AppError {
    AppError::not_found("Record not found")
}

/// 内存数据快照
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    menus: BTreeMap<MenuId, Menu>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    role_menus: BTreeSet<(RoleId, MenuId)>,
}

impl MemoryState {
    // ============ 用户 ============

    pub fn insert_user(&mut self, user: &User) -> AppResult<()> {
        if self.users.contains_key(&user.id) || self.find_user_by_email(&user.email).is_some() {
            return Err(unique_violation());
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub fn update_user(&mut self, user: &User) -> AppResult<()> {
        if !self.users.contains_key(&user.id) {
            return Err(record_not_found());
        }
        if self
            .find_user_by_email(&user.email)
            .is_some_and(|other| other.id != user.id)
        {
            return Err(unique_violation());
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub fn remove_user(&mut self, id: &UserId) {
        self.users.remove(id);
        self.user_roles.retain(|(u, _)| u != id);
    }

    pub fn user(&self, id: &UserId) -> Option<User> {
        self.users.get(id).cloned()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn query_users(
        &self,
        filter: &UserFilter,
        pagination: &Pagination,
        sort: Option<Sort<UserSortField>>,
    ) -> (Vec<User>, u64) {
        let matched: Vec<&User> = self
            .users
            .values()
            .filter(|u| filter.name.as_ref().is_none_or(|n| &u.name == n))
            .filter(|u| filter.email.as_ref().is_none_or(|e| &u.email == e))
            .collect();

        paginate(matched, pagination, |a, b| {
            let ordering = match sort {
                Some(sort) => apply_direction(
                    match sort.field {
                        UserSortField::Name => a.name.cmp(&b.name),
                        UserSortField::Email => a.email.cmp(&b.email),
                        UserSortField::CreatedAt => {
                            a.audit_info.created_at.cmp(&b.audit_info.created_at)
                        }
                        UserSortField::UpdatedAt => {
                            a.audit_info.updated_at.cmp(&b.audit_info.updated_at)
                        }
                    },
                    sort.direction,
                ),
                None => Ordering::Equal,
            };
            ordering
                .then_with(|| a.audit_info.created_at.cmp(&b.audit_info.created_at))
                .then_with(|| a.id.cmp(&b.id))
        })
    }

    // ============ 角色 ============

    pub fn insert_role(&mut self, role: &Role) -> AppResult<()> {
        if self.roles.contains_key(&role.id) || self.find_role_by_name(&role.name).is_some() {
            return Err(unique_violation());
        }
        self.roles.insert(role.id.clone(), role.clone());
        Ok(())
    }

    pub fn update_role(&mut self, role: &Role) -> AppResult<()> {
        if !self.roles.contains_key(&role.id) {
            return Err(record_not_found());
        }
        if self
            .find_role_by_name(&role.name)
            .is_some_and(|other| other.id != role.id)
        {
            return Err(unique_violation());
        }
        self.roles.insert(role.id.clone(), role.clone());
        Ok(())
    }

    pub fn remove_role(&mut self, id: &RoleId) {
        self.roles.remove(id);
        self.user_roles.retain(|(_, r)| r != id);
        self.role_permissions.retain(|(r, _)| r != id);
        self.role_menus.retain(|(r, _)| r != id);
    }

    pub fn role(&self, id: &RoleId) -> Option<Role> {
        self.roles.get(id).cloned()
    }

    pub fn find_role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    pub fn roles_by_ids(&self, ids: &[RoleId]) -> Vec<Role> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.roles.get(id).cloned())
            .collect()
    }

    pub fn query_roles(
        &self,
        filter: &RoleFilter,
        pagination: &Pagination,
        sort: Option<Sort<RoleSortField>>,
    ) -> (Vec<Role>, u64) {
        let matched: Vec<&Role> = self
            .roles
            .values()
            .filter(|r| filter.name.as_ref().is_none_or(|n| &r.name == n))
            .filter(|r| filter.is_active.is_none_or(|a| r.is_active == a))
            .collect();

        paginate(matched, pagination, |a, b| {
            let ordering = match sort {
                Some(sort) => apply_direction(
                    match sort.field {
                        RoleSortField::Name => a.name.cmp(&b.name),
                        RoleSortField::IsActive => a.is_active.cmp(&b.is_active),
                        RoleSortField::CreatedAt => {
                            a.audit_info.created_at.cmp(&b.audit_info.created_at)
                        }
                        RoleSortField::UpdatedAt => {
                            a.audit_info.updated_at.cmp(&b.audit_info.updated_at)
                        }
                    },
                    sort.direction,
                ),
                None => Ordering::Equal,
            };
            ordering
                .then_with(|| a.audit_info.created_at.cmp(&b.audit_info.created_at))
                .then_with(|| a.id.cmp(&b.id))
        })
    }

    pub fn active_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.roles.values().filter(|r| r.is_active).cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    // ============ 权限 ============

    pub fn insert_permission(&mut self, permission: &Permission) -> AppResult<()> {
        if self.permissions.contains_key(&permission.id)
            || self.find_permission_by_name(&permission.name).is_some()
        {
            return Err(unique_violation());
        }
        self.permissions
            .insert(permission.id.clone(), permission.clone());
        Ok(())
    }

    pub fn update_permission(&mut self, permission: &Permission) -> AppResult<()> {
        if !self.permissions.contains_key(&permission.id) {
            return Err(record_not_found());
        }
        if self
            .find_permission_by_name(&permission.name)
            .is_some_and(|other| other.id != permission.id)
        {
            return Err(unique_violation());
        }
        self.permissions
            .insert(permission.id.clone(), permission.clone());
        Ok(())
    }

    pub fn remove_permission(&mut self, id: &PermissionId) {
        self.permissions.remove(id);
        self.role_permissions.retain(|(_, p)| p != id);
    }

    pub fn permission(&self, id: &PermissionId) -> Option<Permission> {
        self.permissions.get(id).cloned()
    }

    pub fn find_permission_by_name(&self, name: &str) -> Option<&Permission> {
        self.permissions.values().find(|p| p.name == name)
    }

    pub fn permissions_by_ids(&self, ids: &[PermissionId]) -> Vec<Permission> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.permissions.get(id).cloned())
            .collect()
    }

    pub fn query_permissions(
        &self,
        filter: &PermissionFilter,
        pagination: &Pagination,
        sort: Option<Sort<PermissionSortField>>,
    ) -> (Vec<Permission>, u64) {
        let matched: Vec<&Permission> = self
            .permissions
            .values()
            .filter(|p| filter.name.as_ref().is_none_or(|v| &p.name == v))
            .filter(|p| filter.action.as_ref().is_none_or(|v| &p.action == v))
            .filter(|p| filter.resource.as_ref().is_none_or(|v| &p.resource == v))
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|v| p.category.as_ref() == Some(v))
            })
            .filter(|p| filter.is_active.is_none_or(|a| p.is_active == a))
            .collect();

        paginate(matched, pagination, |a, b| {
            let ordering = match sort {
                Some(sort) => apply_direction(
                    match sort.field {
                        PermissionSortField::Name => a.name.cmp(&b.name),
                        PermissionSortField::Action => a.action.cmp(&b.action),
                        PermissionSortField::Resource => a.resource.cmp(&b.resource),
                        PermissionSortField::Category => a.category.cmp(&b.category),
                        PermissionSortField::IsActive => a.is_active.cmp(&b.is_active),
                        PermissionSortField::CreatedAt => {
                            a.audit_info.created_at.cmp(&b.audit_info.created_at)
                        }
                        PermissionSortField::UpdatedAt => {
                            a.audit_info.updated_at.cmp(&b.audit_info.updated_at)
                        }
                    },
                    sort.direction,
                ),
                None => Ordering::Equal,
            };
            ordering
                .then_with(|| a.audit_info.created_at.cmp(&b.audit_info.created_at))
                .then_with(|| a.id.cmp(&b.id))
        })
    }

    pub fn active_permissions(&self) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .permissions
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        permissions
    }

    // ============ 菜单 ============

    pub fn insert_menu(&mut self, menu: &Menu) -> AppResult<()> {
        if self.menus.contains_key(&menu.id) {
            return Err(unique_violation());
        }
        self.check_menu_parent(menu)?;
        self.menus.insert(menu.id.clone(), menu.clone());
        Ok(())
    }

    pub fn update_menu(&mut self, menu: &Menu) -> AppResult<()> {
        if !self.menus.contains_key(&menu.id) {
            return Err(record_not_found());
        }
        self.check_menu_parent(menu)?;
        self.menus.insert(menu.id.clone(), menu.clone());
        Ok(())
    }

    fn check_menu_parent(&self, menu: &Menu) -> AppResult<()> {
        match &menu.parent_id {
            Some(parent) if parent != &menu.id && !self.menus.contains_key(parent) => {
                Err(foreign_key_violation())
            }
            _ => Ok(()),
        }
    }

    pub fn remove_menu(&mut self, id: &MenuId) -> AppResult<()> {
        if self.count_children(id) > 0 {
            return Err(foreign_key_violation());
        }
        self.menus.remove(id);
        self.role_menus.retain(|(_, m)| m != id);
        Ok(())
    }

    pub fn menu(&self, id: &MenuId) -> Option<Menu> {
        self.menus.get(id).cloned()
    }

    pub fn menus_by_ids(&self, ids: &[MenuId]) -> Vec<Menu> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.menus.get(id).cloned())
            .collect()
    }

    pub fn children_of(&self, parent_id: &MenuId) -> Vec<Menu> {
        let mut children: Vec<Menu> = self
            .menus
            .values()
            .filter(|m| m.parent_id.as_ref() == Some(parent_id))
            .cloned()
            .collect();
        sort_menus(&mut children);
        children
    }

    pub fn count_children(&self, parent_id: &MenuId) -> u64 {
        self.menus
            .values()
            .filter(|m| m.parent_id.as_ref() == Some(parent_id))
            .count() as u64
    }

    pub fn active_menus(&self) -> Vec<Menu> {
        let mut menus: Vec<Menu> = self.menus.values().filter(|m| m.is_active).cloned().collect();
        sort_menus(&mut menus);
        menus
    }

    // ============ 关联 ============

    pub fn roles_of_user(&self, user_id: &UserId) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .user_roles
            .iter()
            .filter(|(u, _)| u == user_id)
            .filter_map(|(_, r)| self.roles.get(r).cloned())
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    pub fn replace_user_roles(&mut self, user_id: &UserId, role_ids: &[RoleId]) -> AppResult<()> {
        if !self.users.contains_key(user_id) || role_ids.iter().any(|r| !self.roles.contains_key(r))
        {
            return Err(foreign_key_violation());
        }
        self.user_roles.retain(|(u, _)| u != user_id);
        self.user_roles
            .extend(role_ids.iter().map(|r| (user_id.clone(), r.clone())));
        Ok(())
    }

    pub fn count_users_with_role(&self, role_id: &RoleId) -> u64 {
        self.user_roles.iter().filter(|(_, r)| r == role_id).count() as u64
    }

    pub fn clear_user_roles(&mut self, user_id: &UserId) {
        self.user_roles.retain(|(u, _)| u != user_id);
    }

    /// 多个角色关联的权限，未去重
    pub fn permissions_of_roles(&self, role_ids: &[RoleId]) -> Vec<Permission> {
        let wanted: HashSet<&RoleId> = role_ids.iter().collect();
        self.role_permissions
            .iter()
            .filter(|(r, _)| wanted.contains(r))
            .filter_map(|(_, p)| self.permissions.get(p).cloned())
            .collect()
    }

    pub fn permissions_of_role(&self, role_id: &RoleId) -> Vec<Permission> {
        let mut permissions = self.permissions_of_roles(std::slice::from_ref(role_id));
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    pub fn replace_role_permissions(
        &mut self,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        if !self.roles.contains_key(role_id)
            || permission_ids
                .iter()
                .any(|p| !self.permissions.contains_key(p))
        {
            return Err(foreign_key_violation());
        }
        self.role_permissions.retain(|(r, _)| r != role_id);
        self.role_permissions
            .extend(permission_ids.iter().map(|p| (role_id.clone(), p.clone())));
        Ok(())
    }

    pub fn clear_role_permissions(&mut self, role_id: &RoleId) {
        self.role_permissions.retain(|(r, _)| r != role_id);
    }

    /// 多个角色关联的菜单，未过滤、未去重
    pub fn menus_of_roles(&self, role_ids: &[RoleId]) -> Vec<Menu> {
        let wanted: HashSet<&RoleId> = role_ids.iter().collect();
        self.role_menus
            .iter()
            .filter(|(r, _)| wanted.contains(r))
            .filter_map(|(_, m)| self.menus.get(m).cloned())
            .collect()
    }

    pub fn menus_of_role(&self, role_id: &RoleId) -> Vec<Menu> {
        let mut menus = self.menus_of_roles(std::slice::from_ref(role_id));
        sort_menus(&mut menus);
        menus
    }

    pub fn replace_role_menus(&mut self, role_id: &RoleId, menu_ids: &[MenuId]) -> AppResult<()> {
        if !self.roles.contains_key(role_id) || menu_ids.iter().any(|m| !self.menus.contains_key(m))
        {
            return Err(foreign_key_violation());
        }
        self.role_menus.retain(|(r, _)| r != role_id);
        self.role_menus
            .extend(menu_ids.iter().map(|m| (role_id.clone(), m.clone())));
        Ok(())
    }

    pub fn clear_role_menus(&mut self, role_id: &RoleId) {
        self.role_menus.retain(|(r, _)| r != role_id);
    }
}

fn sort_menus(menus: &mut [Menu]) {
    menus.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.id.cmp(&b.id)));
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn paginate<T: Clone>(
    mut matched: Vec<&T>,
    pagination: &Pagination,
    compare: impl Fn(&T, &T) -> Ordering,
) -> (Vec<T>, u64) {
    let total = matched.len() as u64;
    matched.sort_by(|a, b| compare(a, b));

    let page = matched
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(pagination.limit() as usize)
        .cloned()
        .collect();

    (page, total)
}
