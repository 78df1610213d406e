//! 数据库 schema 迁移

use rbac_adapter_postgres::Migration;

/// 服务需要的全部迁移，按版本号升序
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(
        1,
        "rbac_schema",
        include_str!("../../../migrations/0001_rbac_schema.sql"),
    )]
}
