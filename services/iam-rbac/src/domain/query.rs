//! 查询排序参数
//!
//! `sortBy` 只接受各实体白名单内的字段，字段名使用对外的 camelCase 形式

use rbac_common::{SortDirection, SortSpec};
use rbac_errors::{AppError, AppResult};

/// 可排序字段
pub trait SortField: Sized + Copy + Send + Sync {
    /// 从对外字段名解析
    fn parse(name: &str) -> Option<Self>;

    /// 对应的数据库列名
    fn column(&self) -> &'static str;
}

/// 已校验的排序条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// 按白名单校验排序参数，未知字段返回 BadRequest
    pub fn from_spec(spec: &SortSpec) -> AppResult<Self> {
        let field = F::parse(&spec.field)
            .ok_or_else(|| AppError::bad_request(format!("Invalid sort field: {}", spec.field)))?;
        Ok(Self {
            field,
            direction: spec.direction,
        })
    }

    /// 解析可选的 `sortBy` 原始字符串
    pub fn parse_opt(raw: Option<&str>) -> AppResult<Option<Self>> {
        match raw {
            None => Ok(None),
            Some(raw) => {
                let spec = SortSpec::parse(raw)
                    .ok_or_else(|| AppError::bad_request(format!("Invalid sortBy: {}", raw)))?;
                Self::from_spec(&spec).map(Some)
            }
        }
    }

    pub fn is_desc(&self) -> bool {
        self.direction == SortDirection::Desc
    }

    /// 生成 `ORDER BY` 子句内容
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.field.column(), self.direction.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Name,
    }

    impl SortField for Field {
        fn parse(name: &str) -> Option<Self> {
            match name {
                "name" => Some(Field::Name),
                _ => None,
            }
        }

        fn column(&self) -> &'static str {
            "name"
        }
    }

    #[test]
    fn test_parse_known_field() {
        let sort = Sort::<Field>::parse_opt(Some("name:desc")).unwrap().unwrap();
        assert_eq!(sort.field, Field::Name);
        assert!(sort.is_desc());
        assert_eq!(sort.to_sql(), "name DESC");
    }

    #[test]
    fn test_unknown_field_is_bad_request() {
        let err = Sort::<Field>::parse_opt(Some("password:asc")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_missing_sort() {
        assert!(Sort::<Field>::parse_opt(None).unwrap().is_none());
    }
}
