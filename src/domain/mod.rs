// ==========================================
// 项目评审排期系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod project;
pub mod review;
pub mod types;
pub mod user;

// 重导出核心类型
pub use project::Project;
pub use review::Review;
pub use types::{AssignmentKind, ProjectStatus, ReviewStatus};
pub use user::User;
