//! 菜单领域模块

#![allow(clippy::module_inception)]

pub mod menu;
pub mod repository;
pub mod tree;

pub use menu::{
    MENU_COMPONENT_MAX_LEN, MENU_ICON_MAX_LEN, MENU_NAME_MAX_LEN, MENU_PATH_MAX_LEN,
    MENU_TITLE_MAX_LEN, Menu, MenuId, MenuSummary,
};
pub use repository::{MenuRepository, RoleMenuRepository};
#[cfg(test)]
pub use repository::{MockMenuRepository, MockRoleMenuRepository};
pub use tree::{MenuNode, build_tree, flatten_forest};
