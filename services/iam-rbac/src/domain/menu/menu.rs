//! 菜单实体

use derive_more::{Display, From};
use rbac_common::{AuditInfo, new_string_id};
use serde::{Deserialize, Serialize};

/// 菜单 ID
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct MenuId(pub String);

impl MenuId {
    pub fn new() -> Self {
        Self(new_string_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MenuId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MenuId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub const MENU_NAME_MAX_LEN: usize = 100;
pub const MENU_TITLE_MAX_LEN: usize = 200;
pub const MENU_PATH_MAX_LEN: usize = 200;
pub const MENU_ICON_MAX_LEN: usize = 100;
pub const MENU_COMPONENT_MAX_LEN: usize = 100;

/// 菜单实体
///
/// `sort` 升序决定展示顺序，`parent_id` 为空表示顶级菜单
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub title: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub sort: i32,
    pub is_visible: bool,
    pub is_active: bool,
    pub parent_id: Option<MenuId>,
    #[serde(flatten)]
    pub audit_info: AuditInfo,
}

impl Menu {
    pub fn new(name: String) -> Self {
        Self {
            id: MenuId::new(),
            name,
            title: None,
            path: None,
            icon: None,
            component: None,
            sort: 0,
            is_visible: true,
            is_active: true,
            parent_id: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_id(mut self, id: MenuId) -> Self {
        self.id = id;
        self
    }

    pub fn with_parent(mut self, parent_id: MenuId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_sort(mut self, sort: i32) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// 是否对持有角色的用户可见
    pub fn is_displayable(&self) -> bool {
        self.is_active && self.is_visible
    }

    pub fn touch(&mut self) {
        self.audit_info.update();
    }
}

impl PartialEq for Menu {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Menu {}

/// 下拉选择使用的菜单摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: MenuId,
    pub name: String,
    pub title: Option<String>,
    pub parent_id: Option<MenuId>,
}

impl From<&Menu> for MenuSummary {
    fn from(menu: &Menu) -> Self {
        Self {
            id: menu.id.clone(),
            name: menu.name.clone(),
            title: menu.title.clone(),
            parent_id: menu.parent_id.clone(),
        }
    }
}
