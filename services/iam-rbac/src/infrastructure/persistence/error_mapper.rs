//! 数据库错误映射
//!
//! 约束冲突映射为业务错误：唯一约束 -> Conflict，外键 -> BadRequest

use rbac_errors::AppError;

/// 将 SQLx 错误转换为 AppError
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => map_sql_state(&code, &db_err.to_string()),
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::internal("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::internal("Database connection pool is closed"),
        sqlx::Error::Protocol(msg) => {
            AppError::internal(format!("Database protocol error: {}", msg))
        }
        _ => AppError::database(e.to_string()),
    }
}

/// 按 PostgreSQL SQLSTATE 映射
fn map_sql_state(code: &str, message: &str) -> AppError {
    match code {
        "23505" => AppError::conflict("Duplicate entry violates unique constraint"),
        "23503" => AppError::bad_request("Foreign key constraint violation"),
        "23514" => AppError::bad_request("Check constraint violation"),
        "23502" => AppError::bad_request("Not null constraint violation"),
        "22001" => AppError::bad_request("String data too long"),
        "40001" => AppError::conflict("Concurrent update, please retry"),
        _ => AppError::database(format!("Database error ({}): {}", code, message)),
    }
}
