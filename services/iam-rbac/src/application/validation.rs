//! 命令参数校验工具

/// 必填字符串
pub(crate) fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(())
}

/// 长度上限（按字符计）
pub(crate) fn max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{} cannot exceed {} characters", field, max));
    }
    Ok(())
}

/// 可选字段的长度上限
pub(crate) fn max_len_opt(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) => max_len(field, v, max),
        None => Ok(()),
    }
}

/// 必填且不超过上限
pub(crate) fn required_max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    require(field, value)?;
    max_len(field, value, max)
}
