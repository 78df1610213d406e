//! 通用工具函数

use uuid::Uuid;

/// 生成新的 UUID v7（时间有序）
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// 生成新的字符串形式 ID
pub fn new_string_id() -> String {
    new_id().to_string()
}
