//! 集成测试公共工具，基于内存存储

#![allow(dead_code)]

use iam_rbac::AccessContext;
use iam_rbac::application::assignment::{
    SetRoleMenusCommand, SetRolePermissionsCommand, SetUserRolesCommand,
};
use iam_rbac::application::menu::CreateMenuCommand;
use iam_rbac::application::permission::CreatePermissionCommand;
use iam_rbac::application::role::CreateRoleCommand;
use iam_rbac::application::user::CreateUserCommand;
use iam_rbac::domain::access::Identity;
use iam_rbac::domain::menu::{Menu, MenuId};
use iam_rbac::domain::role::{Permission, Role};
use iam_rbac::domain::user::User;
use rbac_config::AccessConfig;

pub fn context() -> AccessContext {
    AccessContext::in_memory(AccessConfig::default())
}

pub fn identity(user: &User) -> Identity {
    Identity::new(user.id.clone())
}

pub async fn create_user(ctx: &AccessContext, email: &str) -> User {
    ctx.user_commands
        .handle_create(CreateUserCommand {
            email: email.to_string(),
            password_hash: "$argon2id$opaque".to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
        })
        .await
        .expect("create user")
}

pub async fn create_role(ctx: &AccessContext, name: &str) -> Role {
    ctx.role_commands
        .handle_create(CreateRoleCommand {
            name: name.to_string(),
            description: None,
            is_active: None,
        })
        .await
        .expect("create role")
}

pub async fn create_permission(ctx: &AccessContext, action: &str, resource: &str) -> Permission {
    ctx.permission_commands
        .handle_create(CreatePermissionCommand {
            name: format!("{} {}", action, resource),
            action: action.to_string(),
            resource: resource.to_string(),
            description: None,
            category: Some(resource.to_string()),
            is_active: None,
        })
        .await
        .expect("create permission")
}

pub async fn create_menu(
    ctx: &AccessContext,
    name: &str,
    sort: i32,
    parent_id: Option<&MenuId>,
) -> Menu {
    ctx.menu_commands
        .handle_create(CreateMenuCommand {
            name: name.to_string(),
            sort: Some(sort),
            parent_id: parent_id.cloned(),
            ..Default::default()
        })
        .await
        .expect("create menu")
}

pub async fn grant_permissions(ctx: &AccessContext, role: &Role, permissions: &[&Permission]) {
    ctx.assignments
        .handle_set_role_permissions(SetRolePermissionsCommand {
            role_id: role.id.clone(),
            permission_ids: permissions.iter().map(|p| p.id.clone()).collect(),
        })
        .await
        .expect("set role permissions");
}

pub async fn grant_menus(ctx: &AccessContext, role: &Role, menus: &[&Menu]) {
    ctx.assignments
        .handle_set_role_menus(SetRoleMenusCommand {
            role_id: role.id.clone(),
            menu_ids: menus.iter().map(|m| m.id.clone()).collect(),
        })
        .await
        .expect("set role menus");
}

pub async fn assign_roles(ctx: &AccessContext, user: &User, roles: &[&Role]) {
    ctx.assignments
        .handle_set_user_roles(SetUserRolesCommand {
            user_id: user.id.clone(),
            role_ids: roles.iter().map(|r| r.id.clone()).collect(),
        })
        .await
        .expect("set user roles");
}
