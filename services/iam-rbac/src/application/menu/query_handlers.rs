//! 菜单查询处理器

use std::sync::Arc;

use rbac_errors::AppResult;
use serde::Serialize;
use tracing::debug;

use super::queries::*;
use crate::application::authorization::MenuResolver;
use crate::domain::UnitOfWorkFactory;
use crate::domain::menu::{Menu, MenuNode, MenuSummary, build_tree};
use crate::error::AccessError;

/// 菜单详情，附带直接子菜单
#[derive(Debug, Clone, Serialize)]
pub struct MenuDetails {
    #[serde(flatten)]
    pub menu: Menu,
    pub children: Vec<Menu>,
}

/// 菜单查询处理器
pub struct MenuQueryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl MenuQueryHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 获取菜单详情
    pub async fn handle_get(&self, query: GetMenuQuery) -> AppResult<MenuDetails> {
        let uow = self.uow_factory.begin_read_only().await?;

        let menu = uow
            .menus()
            .find_by_id(&query.menu_id)
            .await?
            .ok_or(AccessError::MenuNotFound)?;
        let children = uow.menus().find_children(&menu.id).await?;
        uow.rollback().await?;

        Ok(MenuDetails { menu, children })
    }

    /// 列出所有启用的菜单（按 sort 升序）
    pub async fn handle_list_active(&self) -> AppResult<Vec<Menu>> {
        let uow = self.uow_factory.begin_read_only().await?;
        let menus = uow.menus().list_active().await?;
        uow.rollback().await?;

        Ok(menus)
    }

    /// 下拉选择用的菜单摘要
    pub async fn handle_list_for_select(&self) -> AppResult<Vec<MenuSummary>> {
        let menus = self.handle_list_active().await?;
        Ok(menus.iter().map(MenuSummary::from).collect())
    }

    /// 角色集合可见的扁平菜单列表
    pub async fn handle_get_user_menus(&self, query: GetUserMenusQuery) -> AppResult<Vec<Menu>> {
        if query.role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let uow = self.uow_factory.begin_read_only().await?;
        let menus = MenuResolver::resolve_visible(uow.role_menus(), &query.role_ids).await?;
        uow.rollback().await?;

        debug!(roles = query.role_ids.len(), menus = menus.len(), "Visible menus resolved");
        Ok(menus)
    }

    /// 角色集合可见的菜单树
    pub async fn handle_get_user_menu_tree(
        &self,
        query: GetUserMenusQuery,
    ) -> AppResult<Vec<MenuNode>> {
        let menus = self.handle_get_user_menus(query).await?;
        Ok(build_tree(&menus))
    }
}
