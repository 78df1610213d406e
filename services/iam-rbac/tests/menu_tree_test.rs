//! 用户菜单与菜单树集成测试

mod common;

use common::*;
use iam_rbac::application::menu::{
    CreateMenuCommand, GetMenuQuery, GetUserMenusQuery, UpdateMenuCommand,
};
use iam_rbac::domain::menu::{Menu, build_tree, flatten_forest};
use iam_rbac::domain::role::RoleId;

fn ids(menus: &[Menu]) -> Vec<&str> {
    menus.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn test_user_menus_are_visible_deduplicated_and_sorted() {
    let ctx = context();
    let r1 = create_role(&ctx, "r1").await;
    let r2 = create_role(&ctx, "r2").await;

    let settings = create_menu(&ctx, "settings", 30, None).await;
    let dashboard = create_menu(&ctx, "dashboard", 10, None).await;
    let users = create_menu(&ctx, "users", 20, None).await;
    let hidden = ctx
        .menu_commands
        .handle_create(CreateMenuCommand {
            name: "hidden".to_string(),
            sort: Some(5),
            is_visible: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    grant_menus(&ctx, &r1, &[&settings, &dashboard, &hidden]).await;
    grant_menus(&ctx, &r2, &[&users, &dashboard]).await;

    let menus = ctx
        .menu_queries
        .handle_get_user_menus(GetUserMenusQuery {
            role_ids: vec![r1.id.clone(), r2.id.clone()],
        })
        .await
        .unwrap();
    assert_eq!(
        ids(&menus),
        vec![dashboard.id.as_str(), users.id.as_str(), settings.id.as_str()]
    );

    let none = ctx
        .menu_queries
        .handle_get_user_menus(GetUserMenusQuery::default())
        .await
        .unwrap();
    assert!(none.is_empty());

    let unknown = ctx
        .menu_queries
        .handle_get_user_menus(GetUserMenusQuery {
            role_ids: vec![RoleId::from("ghost")],
        })
        .await
        .unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_menu_tree_promotes_orphans_to_roots() {
    let ctx = context();
    let role = create_role(&ctx, "r1").await;

    let m1 = create_menu(&ctx, "m1", 1, None).await;
    let m2 = create_menu(&ctx, "m2", 2, Some(&m1.id)).await;
    // 父菜单已停用，子菜单应提升为根
    let archived = ctx
        .menu_commands
        .handle_create(CreateMenuCommand {
            name: "archived".to_string(),
            sort: Some(0),
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    let m3 = create_menu(&ctx, "m3", 3, Some(&archived.id)).await;

    grant_menus(&ctx, &role, &[&m1, &m2, &m3, &archived]).await;

    let tree = ctx
        .menu_queries
        .handle_get_user_menu_tree(GetUserMenusQuery {
            role_ids: vec![role.id.clone()],
        })
        .await
        .unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].menu, m1);
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].menu, m2);
    assert_eq!(tree[1].menu, m3);
    assert!(tree[1].is_leaf());

    // 展平后重建得到相同的树
    let flattened = flatten_forest(&tree);
    assert_eq!(ids(&flattened), vec![m1.id.as_str(), m2.id.as_str(), m3.id.as_str()]);
    assert_eq!(build_tree(&flattened), tree);
}

#[tokio::test]
async fn test_menu_update_rejects_cycles_and_clears_parent() {
    let ctx = context();
    let root = create_menu(&ctx, "root", 1, None).await;
    let child = create_menu(&ctx, "child", 1, Some(&root.id)).await;
    let grandchild = create_menu(&ctx, "grandchild", 1, Some(&child.id)).await;

    let result = ctx
        .menu_commands
        .handle_update(UpdateMenuCommand {
            menu_id: root.id.clone(),
            parent_id: Some(Some(grandchild.id.clone())),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(rbac_errors::AppError::BadRequest(_))));

    let result = ctx
        .menu_commands
        .handle_update(UpdateMenuCommand {
            menu_id: root.id.clone(),
            parent_id: Some(Some(root.id.clone())),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(rbac_errors::AppError::BadRequest(_))));

    let moved = ctx
        .menu_commands
        .handle_update(UpdateMenuCommand {
            menu_id: grandchild.id.clone(),
            parent_id: Some(None),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(moved.parent_id.is_none());

    let details = ctx
        .menu_queries
        .handle_get(GetMenuQuery {
            menu_id: child.id.clone(),
        })
        .await
        .unwrap();
    assert!(details.children.is_empty());
}

#[tokio::test]
async fn test_menu_create_requires_existing_parent() {
    let ctx = context();

    let result = ctx
        .menu_commands
        .handle_create(CreateMenuCommand {
            name: "orphan".to_string(),
            parent_id: Some("missing".into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        result,
        Err(rbac_errors::AppError::BadRequest(msg)) if msg == "Parent menu not found"
    ));
}

#[tokio::test]
async fn test_list_active_and_select_menus() {
    let ctx = context();
    let b = create_menu(&ctx, "b", 2, None).await;
    let a = create_menu(&ctx, "a", 1, None).await;
    ctx.menu_commands
        .handle_create(CreateMenuCommand {
            name: "off".to_string(),
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    let active = ctx.menu_queries.handle_list_active().await.unwrap();
    assert_eq!(ids(&active), vec![a.id.as_str(), b.id.as_str()]);

    let select = ctx.menu_queries.handle_list_for_select().await.unwrap();
    assert_eq!(select.len(), 2);
    assert_eq!(select[0].name, "a");
}
