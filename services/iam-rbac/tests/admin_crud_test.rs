//! 管理端 CRUD 集成测试

mod common;

use common::*;
use iam_rbac::application::permission::{
    CreatePermissionCommand, DeletePermissionCommand, GetPermissionQuery, QueryPermissionsQuery,
};
use iam_rbac::application::role::{
    CreateRoleCommand, GetRoleQuery, QueryRolesQuery, UpdateRoleCommand,
};
use iam_rbac::application::user::{
    CreateUserCommand, GetUserQuery, QueryUsersQuery, UpdateUserCommand,
};
use iam_rbac::domain::role::{PermissionFilter, RoleFilter};
use rbac_errors::AppError;

// ============ 用户 ============

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let ctx = context();
    create_user(&ctx, "alice@example.com").await;

    let result = ctx
        .user_commands
        .handle_create(CreateUserCommand {
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: "Alice Again".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = ctx
        .user_commands
        .handle_create(CreateUserCommand {
            email: "not-an-email".to_string(),
            password_hash: "hash".to_string(),
            name: "Nobody".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_update_user_email_uniqueness_excludes_self() {
    let ctx = context();
    let alice = create_user(&ctx, "alice@example.com").await;
    create_user(&ctx, "bob@example.com").await;

    let updated = ctx
        .user_commands
        .handle_update(UpdateUserCommand {
            user_id: alice.id.clone(),
            email: Some("alice@example.com".to_string()),
            password_hash: None,
            name: Some("Alice Liddell".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice Liddell");

    let result = ctx
        .user_commands
        .handle_update(UpdateUserCommand {
            user_id: alice.id.clone(),
            email: Some("bob@example.com".to_string()),
            password_hash: None,
            name: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let stored = ctx
        .user_queries
        .handle_get(GetUserQuery { user_id: alice.id })
        .await
        .unwrap();
    assert_eq!(stored.email, "alice@example.com");

    let json = serde_json::to_value(&stored).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_query_users_by_email() {
    let ctx = context();
    create_user(&ctx, "alice@example.com").await;
    create_user(&ctx, "bob@example.com").await;

    let mut query = QueryUsersQuery::default();
    query.filter.email = Some("bob@example.com".to_string());

    let page = ctx.user_queries.handle_query(query).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.results[0].email, "bob@example.com");
}

// ============ 角色 ============

#[tokio::test]
async fn test_role_name_is_unique_on_create_and_rename() {
    let ctx = context();
    let admin = create_role(&ctx, "admin").await;
    create_role(&ctx, "editor").await;

    let result = ctx
        .role_commands
        .handle_create(CreateRoleCommand {
            name: "admin".to_string(),
            description: None,
            is_active: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = ctx
        .role_commands
        .handle_update(UpdateRoleCommand {
            role_id: admin.id.clone(),
            name: Some("editor".to_string()),
            description: None,
            is_active: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = ctx
        .role_commands
        .handle_create(CreateRoleCommand {
            name: "x".repeat(51),
            description: None,
            is_active: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_update_role_clears_description() {
    let ctx = context();
    let role = ctx
        .role_commands
        .handle_create(CreateRoleCommand {
            name: "auditor".to_string(),
            description: Some("Reads audit logs".to_string()),
            is_active: None,
        })
        .await
        .unwrap();

    let updated = ctx
        .role_commands
        .handle_update(UpdateRoleCommand {
            role_id: role.id.clone(),
            name: None,
            description: Some(None),
            is_active: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.description, None);

    let stored = ctx
        .role_queries
        .handle_get(GetRoleQuery {
            role_id: role.id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(stored.role.description, None);
    assert_eq!(stored.role.name, "auditor");
}

#[tokio::test]
async fn test_query_roles_paging_and_sorting() {
    let ctx = context();
    for name in ["delta", "alpha", "echo", "charlie", "bravo"] {
        create_role(&ctx, name).await;
    }

    let page = ctx
        .role_queries
        .handle_query(QueryRolesQuery {
            page: Some(2),
            limit: Some(2),
            sort_by: Some("name:desc".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let names: Vec<&str> = page.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["charlie", "bravo"]);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_results, 5);

    let result = ctx
        .role_queries
        .handle_query(QueryRolesQuery {
            sort_by: Some("password:asc".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("password")));

    let capped = ctx
        .role_queries
        .handle_query(QueryRolesQuery {
            limit: Some(10_000),
            filter: RoleFilter {
                name: Some("alpha".to_string()),
                is_active: Some(true),
            },
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.limit, 100);
    assert_eq!(capped.total_results, 1);
}

#[tokio::test]
async fn test_query_roles_far_past_last_page() {
    let ctx = context();
    for name in ["alpha", "bravo", "charlie"] {
        create_role(&ctx, name).await;
    }

    let page = ctx
        .role_queries
        .handle_query(QueryRolesQuery {
            page: Some(50_000_000),
            limit: Some(100),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(page.results.is_empty());
    assert_eq!(page.page, 50_000_000);
    assert_eq!(page.total_results, 3);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_list_active_roles_for_select() {
    let ctx = context();
    create_role(&ctx, "viewer").await;
    create_role(&ctx, "admin").await;
    ctx.role_commands
        .handle_create(CreateRoleCommand {
            name: "retired".to_string(),
            description: None,
            is_active: Some(false),
        })
        .await
        .unwrap();

    let roles = ctx.role_queries.handle_list_active().await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "viewer"]);
}

// ============ 权限 ============

#[tokio::test]
async fn test_permission_validation_and_uniqueness() {
    let ctx = context();
    create_permission(&ctx, "read", "user").await;

    let duplicate = ctx
        .permission_commands
        .handle_create(CreatePermissionCommand {
            name: "read user".to_string(),
            action: "list".to_string(),
            resource: "user".to_string(),
            description: None,
            category: None,
            is_active: None,
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let colon = ctx
        .permission_commands
        .handle_create(CreatePermissionCommand {
            name: "bad".to_string(),
            action: "read:all".to_string(),
            resource: "user".to_string(),
            description: None,
            category: None,
            is_active: None,
        })
        .await;
    assert!(matches!(colon, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_list_and_query_permissions() {
    let ctx = context();
    let write_user = create_permission(&ctx, "write", "user").await;
    create_permission(&ctx, "read", "user").await;
    create_permission(&ctx, "read", "menu").await;

    let active = ctx.permission_queries.handle_list_active().await.unwrap();
    let names: Vec<&str> = active.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["read menu", "read user", "write user"]);

    let page = ctx
        .permission_queries
        .handle_query(QueryPermissionsQuery {
            filter: PermissionFilter {
                action: Some("read".to_string()),
                ..Default::default()
            },
            sort_by: Some("resource:asc".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let resources: Vec<&str> = page.results.iter().map(|p| p.resource.as_str()).collect();
    assert_eq!(resources, vec!["menu", "user"]);

    ctx.permission_commands
        .handle_delete(DeletePermissionCommand {
            permission_id: write_user.id.clone(),
        })
        .await
        .unwrap();
    let result = ctx
        .permission_queries
        .handle_get(GetPermissionQuery {
            permission_id: write_user.id,
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
