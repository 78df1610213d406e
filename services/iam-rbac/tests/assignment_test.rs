//! 关系分配集成测试

mod common;

use std::sync::Arc;

use common::*;
use iam_rbac::AccessContext;
use iam_rbac::application::assignment::{
    DeleteMenuCommand, DeleteRoleCommand, SetRoleMenusCommand, SetRolePermissionsCommand,
    SetUserRolesCommand,
};
use iam_rbac::application::role::GetRoleQuery;
use iam_rbac::application::user::GetUserRolesQuery;
use iam_rbac::domain::UnitOfWorkFactory;
use iam_rbac::domain::menu::MenuId;
use iam_rbac::domain::role::{PermissionId, RoleId};
use iam_rbac::infrastructure::InMemoryStore;
use rbac_common::UserId;
use rbac_config::AccessConfig;
use rbac_errors::AppError;

// ============ 用户角色 ============

#[tokio::test]
async fn test_set_user_roles_with_unknown_role_changes_nothing() {
    let ctx = context();
    let user = create_user(&ctx, "alice@example.com").await;
    let r1 = create_role(&ctx, "r1").await;
    let r2 = create_role(&ctx, "r2").await;
    assign_roles(&ctx, &user, &[&r1]).await;

    let result = ctx
        .assignments
        .handle_set_user_roles(SetUserRolesCommand {
            user_id: user.id.clone(),
            role_ids: vec![r1.id.clone(), r2.id.clone(), RoleId::from("ghost")],
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "One or more roles not found"));

    let roles = ctx
        .user_queries
        .handle_get_user_roles(GetUserRolesQuery {
            user_id: user.id.clone(),
        })
        .await
        .unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["r1"]);
}

#[tokio::test]
async fn test_set_user_roles_replaces_wholesale() {
    let ctx = context();
    let user = create_user(&ctx, "bob@example.com").await;
    let r1 = create_role(&ctx, "r1").await;
    let r2 = create_role(&ctx, "r2").await;
    let r3 = create_role(&ctx, "r3").await;
    assign_roles(&ctx, &user, &[&r1, &r2]).await;
    assign_roles(&ctx, &user, &[&r3, &r3]).await;

    let roles = ctx
        .user_queries
        .handle_get_user_roles(GetUserRolesQuery {
            user_id: user.id.clone(),
        })
        .await
        .unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["r3"]);

    assign_roles(&ctx, &user, &[]).await;
    let roles = ctx
        .user_queries
        .handle_get_user_roles(GetUserRolesQuery { user_id: user.id })
        .await
        .unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn test_set_user_roles_for_missing_user() {
    let ctx = context();
    let r1 = create_role(&ctx, "r1").await;

    let result = ctx
        .assignments
        .handle_set_user_roles(SetUserRolesCommand {
            user_id: UserId::from("ghost"),
            role_ids: vec![r1.id],
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============ 角色菜单 / 权限 ============

#[tokio::test]
async fn test_set_role_menus_and_permissions_are_all_or_nothing() {
    let ctx = context();
    let role = create_role(&ctx, "editor").await;
    let menu = create_menu(&ctx, "dashboard", 1, None).await;
    let permission = create_permission(&ctx, "read", "user").await;
    grant_menus(&ctx, &role, &[&menu]).await;
    grant_permissions(&ctx, &role, &[&permission]).await;

    let result = ctx
        .assignments
        .handle_set_role_menus(SetRoleMenusCommand {
            role_id: role.id.clone(),
            menu_ids: vec![MenuId::from("ghost")],
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let result = ctx
        .assignments
        .handle_set_role_permissions(SetRolePermissionsCommand {
            role_id: role.id.clone(),
            permission_ids: vec![PermissionId::from("ghost")],
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let details = ctx
        .role_queries
        .handle_get(GetRoleQuery {
            role_id: role.id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(details.menus, vec![menu]);
    assert_eq!(details.permissions, vec![permission]);

    let result = ctx
        .assignments
        .handle_set_role_menus(SetRoleMenusCommand {
            role_id: RoleId::from("ghost"),
            menu_ids: vec![],
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============ 删除角色 ============

#[tokio::test]
async fn test_delete_role_blocked_while_assigned() {
    let store = InMemoryStore::new();
    let ctx = AccessContext::new(Arc::new(store.clone()), AccessConfig::default());

    let user = create_user(&ctx, "carol@example.com").await;
    let role = create_role(&ctx, "auditor").await;
    let menu = create_menu(&ctx, "reports", 1, None).await;
    let permission = create_permission(&ctx, "read", "report").await;
    grant_menus(&ctx, &role, &[&menu]).await;
    grant_permissions(&ctx, &role, &[&permission]).await;
    assign_roles(&ctx, &user, &[&role]).await;

    let delete = DeleteRoleCommand {
        role_id: role.id.clone(),
    };

    let result = ctx.assignments.handle_delete_role(delete.clone()).await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Role is still assigned to users"));

    assign_roles(&ctx, &user, &[]).await;
    ctx.assignments.handle_delete_role(delete.clone()).await.unwrap();

    let result = ctx
        .role_queries
        .handle_get(GetRoleQuery {
            role_id: role.id.clone(),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let uow = store.begin_read_only().await.unwrap();
    assert!(uow.role_menus().find_role_menus(&role.id).await.unwrap().is_empty());
    assert!(
        uow.role_permissions()
            .find_role_permissions(&role.id)
            .await
            .unwrap()
            .is_empty()
    );
    // 菜单与权限本身保留
    assert!(uow.menus().find_by_id(&menu.id).await.unwrap().is_some());
    assert!(uow.permissions().find_by_id(&permission.id).await.unwrap().is_some());
    uow.rollback().await.unwrap();

    let result = ctx.assignments.handle_delete_role(delete).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============ 删除菜单 ============

#[tokio::test]
async fn test_delete_menu_blocked_while_it_has_children() {
    let ctx = context();
    let parent = create_menu(&ctx, "system", 1, None).await;
    let child = create_menu(&ctx, "users", 1, Some(&parent.id)).await;

    let result = ctx
        .assignments
        .handle_delete_menu(DeleteMenuCommand {
            menu_id: parent.id.clone(),
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    ctx.assignments
        .handle_delete_menu(DeleteMenuCommand { menu_id: child.id })
        .await
        .unwrap();
    ctx.assignments
        .handle_delete_menu(DeleteMenuCommand {
            menu_id: parent.id.clone(),
        })
        .await
        .unwrap();

    let result = ctx
        .assignments
        .handle_delete_menu(DeleteMenuCommand { menu_id: parent.id })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
