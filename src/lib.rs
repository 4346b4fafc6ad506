// ==========================================
// 项目评审排期系统 - 核心库
// ==========================================
// 职责: 评审到期计算 + 评审人分配
// 存储: CSV 表格文件 / SQLite
// 系统定位: 批处理工具（单写者，顺序执行）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssignmentKind, ProjectStatus, ReviewStatus};

// 领域实体
pub use domain::{Project, Review, User};

// 引擎
pub use engine::{AssignmentEngine, DueDateEngine, ReportEngine};

// API
pub use api::{assign_all_reviewers, calculate_all_reviews, SchedulerApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "项目评审排期系统";
