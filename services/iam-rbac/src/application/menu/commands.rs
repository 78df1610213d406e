//! 菜单相关命令定义

use crate::application::validation::{max_len_opt, required_max_len};
use crate::domain::menu::{
    MENU_COMPONENT_MAX_LEN, MENU_ICON_MAX_LEN, MENU_NAME_MAX_LEN, MENU_PATH_MAX_LEN,
    MENU_TITLE_MAX_LEN, Menu, MenuId,
};

fn validate_display_fields(
    title: Option<&str>,
    path: Option<&str>,
    icon: Option<&str>,
    component: Option<&str>,
) -> Result<(), String> {
    max_len_opt("Title", title, MENU_TITLE_MAX_LEN)?;
    max_len_opt("Path", path, MENU_PATH_MAX_LEN)?;
    max_len_opt("Icon", icon, MENU_ICON_MAX_LEN)?;
    max_len_opt("Component", component, MENU_COMPONENT_MAX_LEN)
}

/// 创建菜单命令
#[derive(Debug, Clone, Default)]
pub struct CreateMenuCommand {
    pub name: String,
    pub title: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub sort: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_active: Option<bool>,
    pub parent_id: Option<MenuId>,
}

impl CreateMenuCommand {
    pub fn validate(&self) -> Result<(), String> {
        required_max_len("Menu name", &self.name, MENU_NAME_MAX_LEN)?;
        validate_display_fields(
            self.title.as_deref(),
            self.path.as_deref(),
            self.icon.as_deref(),
            self.component.as_deref(),
        )
    }

    pub fn into_menu(self) -> Menu {
        let mut menu = Menu::new(self.name);
        menu.title = self.title;
        menu.path = self.path;
        menu.icon = self.icon;
        menu.component = self.component;
        menu.sort = self.sort.unwrap_or(0);
        menu.is_visible = self.is_visible.unwrap_or(true);
        menu.is_active = self.is_active.unwrap_or(true);
        menu.parent_id = self.parent_id;
        menu
    }
}

/// 更新菜单命令，只修改提供的字段
///
/// `parent_id` 为 `Some(None)` 时移到顶级
#[derive(Debug, Clone, Default)]
pub struct UpdateMenuCommand {
    pub menu_id: MenuId,
    pub name: Option<String>,
    pub title: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub sort: Option<i32>,
    pub is_visible: Option<bool>,
    pub is_active: Option<bool>,
    pub parent_id: Option<Option<MenuId>>,
}

impl UpdateMenuCommand {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none()
            && self.title.is_none()
            && self.path.is_none()
            && self.icon.is_none()
            && self.component.is_none()
            && self.sort.is_none()
            && self.is_visible.is_none()
            && self.is_active.is_none()
            && self.parent_id.is_none()
        {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(ref name) = self.name {
            required_max_len("Menu name", name, MENU_NAME_MAX_LEN)?;
        }
        validate_display_fields(
            self.title.as_deref(),
            self.path.as_deref(),
            self.icon.as_deref(),
            self.component.as_deref(),
        )
    }

    pub fn apply_to(self, menu: &mut Menu) {
        if let Some(name) = self.name {
            menu.name = name;
        }
        if let Some(title) = self.title {
            menu.title = Some(title);
        }
        if let Some(path) = self.path {
            menu.path = Some(path);
        }
        if let Some(icon) = self.icon {
            menu.icon = Some(icon);
        }
        if let Some(component) = self.component {
            menu.component = Some(component);
        }
        if let Some(sort) = self.sort {
            menu.sort = sort;
        }
        if let Some(is_visible) = self.is_visible {
            menu.is_visible = is_visible;
        }
        if let Some(is_active) = self.is_active {
            menu.is_active = is_active;
        }
        if let Some(parent_id) = self.parent_id {
            menu.parent_id = parent_id;
        }
        menu.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let cmd = CreateMenuCommand {
            name: "system".to_string(),
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());

        let menu = cmd.into_menu();
        assert!(menu.is_visible && menu.is_active);
        assert_eq!(menu.sort, 0);
    }

    #[test]
    fn test_create_validation_lengths() {
        let cmd = CreateMenuCommand {
            name: "system".to_string(),
            icon: Some("i".repeat(101)),
            ..Default::default()
        };
        assert_eq!(cmd.validate().unwrap_err(), "Icon cannot exceed 100 characters");
    }

    #[test]
    fn test_update_can_clear_parent() {
        let mut menu = Menu::new("child".to_string()).with_parent(MenuId::from("p"));
        let cmd = UpdateMenuCommand {
            menu_id: menu.id.clone(),
            parent_id: Some(None),
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());

        cmd.apply_to(&mut menu);
        assert!(menu.parent_id.is_none());
        assert_eq!(menu.name, "child");
    }

    #[test]
    fn test_update_requires_a_field() {
        let cmd = UpdateMenuCommand {
            menu_id: MenuId::from("m1"),
            ..Default::default()
        };
        assert!(cmd.validate().is_err());
    }
}
