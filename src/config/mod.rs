// ==========================================
// 项目评审排期系统 - 配置层
// ==========================================
// 职责: 数据位置、存储后端与引擎参数
// ==========================================

pub mod scheduler_config;

// 重导出核心配置
pub use scheduler_config::{
    config_keys, default_data_dir, ConfigError, SchedulerConfig, StoreBackend,
};
