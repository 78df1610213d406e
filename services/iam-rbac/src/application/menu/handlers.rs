//! 菜单命令处理器
//!
//! 删除菜单涉及子菜单校验，由 `AssignmentCommandHandler` 负责

use std::collections::HashSet;
use std::sync::Arc;

use rbac_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::menu::{Menu, MenuId, MenuRepository};
use crate::error::AccessError;

/// 菜单命令处理器
pub struct MenuCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl MenuCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建菜单
    pub async fn handle_create(&self, cmd: CreateMenuCommand) -> AppResult<Menu> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        if let Some(ref parent_id) = cmd.parent_id
            && uow.menus().find_by_id(parent_id).await?.is_none()
        {
            return Err(AccessError::ParentMenuNotFound.into());
        }

        let menu = cmd.into_menu();
        uow.menus().create(&menu).await?;
        uow.commit().await?;

        info!(menu_id = %menu.id, name = %menu.name, "Menu created");
        Ok(menu)
    }

    /// 更新菜单
    pub async fn handle_update(&self, cmd: UpdateMenuCommand) -> AppResult<Menu> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        let mut menu = uow
            .menus()
            .find_by_id(&cmd.menu_id)
            .await?
            .ok_or(AccessError::MenuNotFound)?;

        if let Some(Some(ref parent_id)) = cmd.parent_id {
            ensure_valid_parent(uow.menus(), &menu.id, parent_id).await?;
        }

        cmd.apply_to(&mut menu);
        uow.menus().update(&menu).await?;
        uow.commit().await?;

        info!(menu_id = %menu.id, "Menu updated");
        Ok(menu)
    }
}

/// 新父菜单必须存在，且不能是菜单自身或其后代
async fn ensure_valid_parent(
    menus: &dyn MenuRepository,
    menu_id: &MenuId,
    parent_id: &MenuId,
) -> AppResult<()> {
    let mut visited = HashSet::new();
    let mut current = Some(parent_id.clone());

    while let Some(id) = current {
        if &id == menu_id {
            return Err(AccessError::MenuCycle.into());
        }
        // 已有数据成环时停止上溯
        if !visited.insert(id.clone()) {
            break;
        }

        match menus.find_by_id(&id).await? {
            Some(ancestor) => current = ancestor.parent_id,
            None if &id == parent_id => return Err(AccessError::ParentMenuNotFound.into()),
            None => break,
        }
    }

    Ok(())
}
