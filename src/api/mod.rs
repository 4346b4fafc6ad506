// ==========================================
// 项目评审排期系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行入口与外部调用方使用
// ==========================================

pub mod error;
pub mod scheduler_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use scheduler_api::{
    assign_all_reviewers, calculate_all_reviews, parse_reference_date, resolve_reference_date,
    CycleSummary, SchedulerApi,
};
