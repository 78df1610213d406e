//! 事务内的 PostgreSQL 仓储
//!
//! 所有仓储共享同一个事务，由 Unit of Work 负责提交或回滚

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rbac_common::{AuditInfo, Pagination, UserId};
use rbac_errors::{AppError, AppResult};
use sqlx::{Postgres, QueryBuilder, Transaction};
use tokio::sync::Mutex;

use super::error_mapper::map_sqlx_error;
use crate::domain::menu::{Menu, MenuId, MenuRepository, RoleMenuRepository};
use crate::domain::query::{Sort, SortField};
use crate::domain::role::{
    Permission, PermissionFilter, PermissionId, PermissionRepository, PermissionSortField, Role,
    RoleFilter, RoleId, RolePermissionRepository, RoleRepository, RoleSortField,
};
use crate::domain::user::{User, UserFilter, UserRepository, UserRoleRepository, UserSortField};

/// 共享事务
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxUserRepository);
define_tx_repo!(TxRoleRepository);
define_tx_repo!(TxPermissionRepository);
define_tx_repo!(TxMenuRepository);
define_tx_repo!(TxUserRoleRepository);
define_tx_repo!(TxRolePermissionRepository);
define_tx_repo!(TxRoleMenuRepository);

const USER_COLUMNS: &str = "id, email, password_hash, name, is_email_verified, created_at, updated_at";
const ROLE_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";
const PERMISSION_COLUMNS: &str =
    "id, name, action, resource, description, category, is_active, created_at, updated_at";
const MENU_COLUMNS: &str = "id, name, title, path, icon, component, sort, is_visible, is_active, parent_id, created_at, updated_at";

fn to_strings<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.map(str::to_string).collect()
}

/// 追加 `ORDER BY` 与分页，排序字段之后固定按创建时间和 ID 决胜
fn push_order_and_page<F: SortField>(
    builder: &mut QueryBuilder<'_, Postgres>,
    sort: Option<Sort<F>>,
    pagination: &Pagination,
) {
    builder.push(" ORDER BY ");
    if let Some(sort) = sort {
        builder.push(sort.to_sql());
        builder.push(", ");
    }
    builder.push("created_at ASC, id ASC LIMIT ");
    builder.push_bind(i64::from(pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));
}

fn push_eq<'a, T>(builder: &mut QueryBuilder<'a, Postgres>, column: &str, value: &Option<T>)
where
    T: Clone + Send + 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = value {
        builder.push(format!(" AND {} = ", column));
        builder.push_bind(value.clone());
    }
}

// ============ 用户 ============

fn push_user_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    push_eq(builder, "name", &filter.name);
    push_eq(builder, "email", &filter.email);
}

#[async_trait]
impl UserRepository for TxUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, is_email_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.is_email_verified)
        .bind(user.audit_info.created_at)
        .bind(user.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, name = $4, is_email_verified = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.is_email_verified)
        .bind(user.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn query(
        &self,
        filter: &UserFilter,
        pagination: &Pagination,
        sort: Option<Sort<UserSortField>>,
    ) -> AppResult<(Vec<User>, u64)> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let mut query_builder =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));
        push_user_filter(&mut query_builder, filter);
        push_order_and_page(&mut query_builder, sort, pagination);

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_user_filter(&mut count_builder, filter);

        let rows = query_builder
            .build_query_as::<UserRow>()
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        let count: (i64,) = count_builder
            .build_query_as()
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok((rows.into_iter().map(Into::into).collect(), count.0 as u64))
    }
}

// ============ 角色 ============

fn push_role_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RoleFilter) {
    push_eq(builder, "name", &filter.name);
    push_eq(builder, "is_active", &filter.is_active);
}

#[async_trait]
impl RoleRepository for TxRoleRepository {
    async fn create(&self, role: &Role) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.id.as_str())
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.is_active)
        .bind(role.audit_info.created_at)
        .bind(role.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(role.id.as_str())
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.is_active)
        .bind(role.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &RoleId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &RoleId) -> AppResult<Option<Role>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE id = $1",
            ROLE_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE name = $1",
            ROLE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE id = ANY($1)",
            ROLE_COLUMNS
        ))
        .bind(to_strings(ids.iter().map(RoleId::as_str)))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn query(
        &self,
        filter: &RoleFilter,
        pagination: &Pagination,
        sort: Option<Sort<RoleSortField>>,
    ) -> AppResult<(Vec<Role>, u64)> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let mut query_builder =
            QueryBuilder::new(format!("SELECT {} FROM roles WHERE 1 = 1", ROLE_COLUMNS));
        push_role_filter(&mut query_builder, filter);
        push_order_and_page(&mut query_builder, sort, pagination);

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM roles WHERE 1 = 1");
        push_role_filter(&mut count_builder, filter);

        let rows = query_builder
            .build_query_as::<RoleRow>()
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        let count: (i64,) = count_builder
            .build_query_as()
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok((rows.into_iter().map(Into::into).collect(), count.0 as u64))
    }

    async fn list_active(&self) -> AppResult<Vec<Role>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE is_active = TRUE ORDER BY name ASC",
            ROLE_COLUMNS
        ))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ============ 权限 ============

fn push_permission_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PermissionFilter) {
    push_eq(builder, "name", &filter.name);
    push_eq(builder, "action", &filter.action);
    push_eq(builder, "resource", &filter.resource);
    push_eq(builder, "category", &filter.category);
    push_eq(builder, "is_active", &filter.is_active);
}

#[async_trait]
impl PermissionRepository for TxPermissionRepository {
    async fn create(&self, permission: &Permission) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO permissions (id, name, action, resource, description, category, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(permission.id.as_str())
        .bind(&permission.name)
        .bind(&permission.action)
        .bind(&permission.resource)
        .bind(&permission.description)
        .bind(&permission.category)
        .bind(permission.is_active)
        .bind(permission.audit_info.created_at)
        .bind(permission.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET name = $2, action = $3, resource = $4, description = $5, category = $6,
                is_active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(permission.id.as_str())
        .bind(&permission.name)
        .bind(&permission.action)
        .bind(&permission.resource)
        .bind(&permission.description)
        .bind(&permission.category)
        .bind(permission.is_active)
        .bind(permission.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &PermissionId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PermissionId) -> AppResult<Option<Permission>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {} FROM permissions WHERE id = $1",
            PERMISSION_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {} FROM permissions WHERE name = $1",
            PERMISSION_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {} FROM permissions WHERE id = ANY($1)",
            PERMISSION_COLUMNS
        ))
        .bind(to_strings(ids.iter().map(PermissionId::as_str)))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn query(
        &self,
        filter: &PermissionFilter,
        pagination: &Pagination,
        sort: Option<Sort<PermissionSortField>>,
    ) -> AppResult<(Vec<Permission>, u64)> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let mut query_builder = QueryBuilder::new(format!(
            "SELECT {} FROM permissions WHERE 1 = 1",
            PERMISSION_COLUMNS
        ));
        push_permission_filter(&mut query_builder, filter);
        push_order_and_page(&mut query_builder, sort, pagination);

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM permissions WHERE 1 = 1");
        push_permission_filter(&mut count_builder, filter);

        let rows = query_builder
            .build_query_as::<PermissionRow>()
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        let count: (i64,) = count_builder
            .build_query_as()
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok((rows.into_iter().map(Into::into).collect(), count.0 as u64))
    }

    async fn list_active(&self) -> AppResult<Vec<Permission>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {} FROM permissions WHERE is_active = TRUE ORDER BY category ASC NULLS FIRST, name ASC",
            PERMISSION_COLUMNS
        ))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ============ 菜单 ============

#[async_trait]
impl MenuRepository for TxMenuRepository {
    async fn create(&self, menu: &Menu) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO menus (id, name, title, path, icon, component, sort, is_visible, is_active, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(menu.id.as_str())
        .bind(&menu.name)
        .bind(&menu.title)
        .bind(&menu.path)
        .bind(&menu.icon)
        .bind(&menu.component)
        .bind(menu.sort)
        .bind(menu.is_visible)
        .bind(menu.is_active)
        .bind(menu.parent_id.as_ref().map(MenuId::as_str))
        .bind(menu.audit_info.created_at)
        .bind(menu.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE menus
            SET name = $2, title = $3, path = $4, icon = $5, component = $6, sort = $7,
                is_visible = $8, is_active = $9, parent_id = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(menu.id.as_str())
        .bind(&menu.name)
        .bind(&menu.title)
        .bind(&menu.path)
        .bind(&menu.icon)
        .bind(&menu.component)
        .bind(menu.sort)
        .bind(menu.is_visible)
        .bind(menu.is_active)
        .bind(menu.parent_id.as_ref().map(MenuId::as_str))
        .bind(menu.audit_info.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &MenuId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &MenuId) -> AppResult<Option<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {} FROM menus WHERE id = $1",
            MENU_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {} FROM menus WHERE id = ANY($1)",
            MENU_COLUMNS
        ))
        .bind(to_strings(ids.iter().map(MenuId::as_str)))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_children(&self, parent_id: &MenuId) -> AppResult<Vec<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {} FROM menus WHERE parent_id = $1 ORDER BY sort ASC, id ASC",
            MENU_COLUMNS
        ))
        .bind(parent_id.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active(&self) -> AppResult<Vec<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {} FROM menus WHERE is_active = TRUE ORDER BY sort ASC, id ASC",
            MENU_COLUMNS
        ))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_children(&self, parent_id: &MenuId) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus WHERE parent_id = $1")
            .bind(parent_id.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.0 as u64)
    }
}

// ============ 关联 ============

#[async_trait]
impl UserRoleRepository for TxUserRoleRepository {
    async fn find_roles_by_user(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.description, r.is_active, r.created_at, r.updated_at
            FROM roles r
            INNER JOIN users_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_user_roles(&self, user_id: &UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM users_roles WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        if !role_ids.is_empty() {
            sqlx::query(
                "INSERT INTO users_roles (user_id, role_id) SELECT $1, UNNEST($2::varchar[])",
            )
            .bind(user_id.as_str())
            .bind(to_strings(role_ids.iter().map(RoleId::as_str)))
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn count_users_with_role(&self, role_id: &RoleId) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users_roles WHERE role_id = $1")
            .bind(role_id.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.0 as u64)
    }

    async fn clear_user_roles(&self, user_id: &UserId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM users_roles WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for TxRolePermissionRepository {
    async fn find_permissions_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Permission>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT p.id, p.name, p.action, p.resource, p.description, p.category,
                   p.is_active, p.created_at, p.updated_at
            FROM permissions p
            INNER JOIN permissions_roles pr ON pr.permission_id = p.id
            WHERE pr.role_id = ANY($1)
            "#,
        )
        .bind(to_strings(role_ids.iter().map(RoleId::as_str)))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<Vec<Permission>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT p.id, p.name, p.action, p.resource, p.description, p.category,
                   p.is_active, p.created_at, p.updated_at
            FROM permissions p
            INNER JOIN permissions_roles pr ON pr.permission_id = p.id
            WHERE pr.role_id = $1
            ORDER BY p.name ASC
            "#,
        )
        .bind(role_id.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM permissions_roles WHERE role_id = $1")
            .bind(role_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        if !permission_ids.is_empty() {
            sqlx::query(
                "INSERT INTO permissions_roles (role_id, permission_id) SELECT $1, UNNEST($2::varchar[])",
            )
            .bind(role_id.as_str())
            .bind(to_strings(permission_ids.iter().map(PermissionId::as_str)))
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn clear_role_permissions(&self, role_id: &RoleId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM permissions_roles WHERE role_id = $1")
            .bind(role_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl RoleMenuRepository for TxRoleMenuRepository {
    async fn find_menus_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Menu>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT m.id, m.name, m.title, m.path, m.icon, m.component, m.sort,
                   m.is_visible, m.is_active, m.parent_id, m.created_at, m.updated_at
            FROM menus m
            INNER JOIN menus_roles mr ON mr.menu_id = m.id
            WHERE mr.role_id = ANY($1)
            "#,
        )
        .bind(to_strings(role_ids.iter().map(RoleId::as_str)))
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_role_menus(&self, role_id: &RoleId) -> AppResult<Vec<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT m.id, m.name, m.title, m.path, m.icon, m.component, m.sort,
                   m.is_visible, m.is_active, m.parent_id, m.created_at, m.updated_at
            FROM menus m
            INNER JOIN menus_roles mr ON mr.menu_id = m.id
            WHERE mr.role_id = $1
            ORDER BY m.sort ASC, m.id ASC
            "#,
        )
        .bind(role_id.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_role_menus(&self, role_id: &RoleId, menu_ids: &[MenuId]) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM menus_roles WHERE role_id = $1")
            .bind(role_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        if !menu_ids.is_empty() {
            sqlx::query(
                "INSERT INTO menus_roles (role_id, menu_id) SELECT $1, UNNEST($2::varchar[])",
            )
            .bind(role_id.as_str())
            .bind(to_strings(menu_ids.iter().map(MenuId::as_str)))
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn clear_role_menus(&self, role_id: &RoleId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query("DELETE FROM menus_roles WHERE role_id = $1")
            .bind(role_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

// ============ 数据行映射 ============

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    is_email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            is_email_verified: row.is_email_verified,
            audit_info: AuditInfo {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: String,
    name: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: RoleId(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            audit_info: AuditInfo {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct PermissionRow {
    id: String,
    name: String,
    action: String,
    resource: String,
    description: Option<String>,
    category: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Permission {
            id: PermissionId(row.id),
            name: row.name,
            action: row.action,
            resource: row.resource,
            description: row.description,
            category: row.category,
            is_active: row.is_active,
            audit_info: AuditInfo {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: String,
    name: String,
    title: Option<String>,
    path: Option<String>,
    icon: Option<String>,
    component: Option<String>,
    sort: i32,
    is_visible: bool,
    is_active: bool,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: MenuId(row.id),
            name: row.name,
            title: row.title,
            path: row.path,
            icon: row.icon,
            component: row.component,
            sort: row.sort,
            is_visible: row.is_visible,
            is_active: row.is_active,
            parent_id: row.parent_id.map(MenuId),
            audit_info: AuditInfo {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}
