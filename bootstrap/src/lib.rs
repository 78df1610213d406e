//! rbac-bootstrap - 服务启动骨架
//!
//! 加载配置、初始化日志与指标、建立存储连接

mod infrastructure;
mod runtime;

pub use infrastructure::*;
pub use runtime::*;
