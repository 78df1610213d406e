//! 通用类型定义

use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::utils::new_string_id;

/// 用户 ID
///
/// 存储层使用不透明字符串作为主键
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(new_string_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 审计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditInfo {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// 分页参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Pagination {
    /// 创建分页参数，页码和每页数量至少为 1
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// 根据可选输入构建分页参数，并限制每页最大数量
    pub fn resolve(
        page: Option<u32>,
        page_size: Option<u32>,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Self {
        let page_size = page_size.unwrap_or(default_page_size).min(max_page_size);
        Self::new(page.unwrap_or(1), page_size)
    }

    /// 跳过的记录数，以 u64 计算，页码再大也不会溢出
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl<T> PagedResult<T> {
    pub fn new(results: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        let total_pages = if pagination.page_size == 0 {
            0
        } else {
            total.div_ceil(pagination.page_size as u64) as u32
        };
        Self {
            results,
            page: pagination.page,
            limit: pagination.page_size,
            total_pages,
            total_results: total,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 排序参数，格式为 `field:asc` 或 `field:desc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// 解析 `sortBy` 参数，方向缺省或无法识别时按升序处理
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(2, ':');
        let field = parts.next()?.trim();
        if field.is_empty() {
            return None;
        }
        let direction = match parts.next().map(str::trim) {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }

    pub fn is_desc(&self) -> bool {
        self.direction == SortDirection::Desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination::new(3, 10);
        assert_eq!(p.offset(), 20);
        assert_eq!(Pagination::new(0, 0), Pagination::new(1, 1));
    }

    #[test]
    fn test_pagination_resolve_caps_page_size() {
        let p = Pagination::resolve(None, Some(500), 10, 100);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 100);

        let p = Pagination::resolve(Some(2), None, 10, 100);
        assert_eq!(p.page_size, 10);
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_pagination_offset_for_huge_page() {
        let p = Pagination::resolve(Some(50_000_000), Some(100), 10, 100);
        assert_eq!(p.offset(), 4_999_999_900);

        let p = Pagination::new(u32::MAX, u32::MAX);
        assert_eq!(p.offset(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn test_paged_result_total_pages() {
        let p = Pagination::new(1, 10);
        let result = PagedResult::new(vec![1, 2, 3], 21, &p);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_results, 21);

        let empty: PagedResult<i32> = PagedResult::new(vec![], 0, &p);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_sort_spec_parse() {
        assert_eq!(SortSpec::parse("name:desc"), Some(SortSpec::desc("name")));
        assert_eq!(SortSpec::parse("name:asc"), Some(SortSpec::asc("name")));
        assert_eq!(SortSpec::parse("name"), Some(SortSpec::asc("name")));
        assert_eq!(SortSpec::parse(":desc"), None);
    }

    #[test]
    fn test_user_id_is_transparent() {
        let id = UserId::from("u-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-1\"");
        assert_eq!(id.to_string(), "u-1");
        assert_ne!(UserId::new(), UserId::new());
    }
}
