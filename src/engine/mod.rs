// ==========================================
// 项目评审排期系统 - 引擎层
// ==========================================
// 职责: 到期计算 / 评审人分配 / 校验 / 报表 / 通知
// 红线: 引擎不读系统时钟，基准日一律显式传入
// ==========================================

pub mod assignment;
pub mod due_date;
pub mod error;
pub mod notification;
pub mod report;
pub mod review_id;
pub mod validation;

// 重导出核心引擎
pub use assignment::{
    AssignmentEngine, AssignmentFailure, AssignmentSummary, ReviewerChoice,
    NO_AVAILABLE_REVIEWERS,
};
pub use due_date::{DueDateEngine, DueDateRun, DueStatus, StatusSummary};
pub use error::{EngineError, EngineResult};
pub use notification::{
    LogNotificationSink, NotificationDispatcher, NotificationMessage, NotificationSink,
    NotificationSummary,
};
pub use report::{OverdueRow, ReportEngine, ScheduleRow, WorkloadRow};
pub use review_id::{ReviewIdGenerator, ReviewIdStrategy, SequentialReviewIds, UuidReviewIds};
pub use validation::{RecordValidator, ValidationReport};
