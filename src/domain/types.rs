// ==========================================
// 项目评审排期系统 - 领域类型定义
// ==========================================
// 状态值的文本形式与表格文件保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 项目评审状态 (Project Status)
// ==========================================
// 派生字段: 由到期计算引擎写入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Overdue")]
    Overdue, // 已逾期
    #[serde(rename = "Due Soon")]
    DueSoon, // 即将到期
    #[serde(rename = "Up to Date")]
    UpToDate, // 正常
}

impl ProjectStatus {
    /// 表格文件中的文本形式
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Overdue => "Overdue",
            ProjectStatus::DueSoon => "Due Soon",
            ProjectStatus::UpToDate => "Up to Date",
        }
    }

    /// 从文本解析（大小写与首尾空白不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overdue" => Some(ProjectStatus::Overdue),
            "due soon" => Some(ProjectStatus::DueSoon),
            "up to date" => Some(ProjectStatus::UpToDate),
            _ => None,
        }
    }

    /// 是否需要安排评审 (Overdue / Due Soon)
    pub fn needs_review(&self) -> bool {
        matches!(self, ProjectStatus::Overdue | ProjectStatus::DueSoon)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 评审记录状态 (Review Status)
// ==========================================
// 流转: Scheduled -> In Progress -> Completed (或 -> Overdue)
// 流转由外部流程驱动，核心只创建 Scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(rename = "Scheduled")]
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Scheduled => "Scheduled",
            ReviewStatus::InProgress => "In Progress",
            ReviewStatus::Completed => "Completed",
            ReviewStatus::Overdue => "Overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(ReviewStatus::Scheduled),
            "in progress" => Some(ReviewStatus::InProgress),
            "completed" => Some(ReviewStatus::Completed),
            "overdue" => Some(ReviewStatus::Overdue),
            _ => None,
        }
    }

    /// 活跃评审: Scheduled / In Progress
    ///
    /// Overdue 状态的评审不计入活跃（不占用评审人负载，也不阻止再次分配）
    pub fn is_active(&self) -> bool {
        matches!(self, ReviewStatus::Scheduled | ReviewStatus::InProgress)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 分配方式 (Assignment Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentKind {
    CrossDepartment, // 跨部门（优先）
    SameDepartment,  // 同部门兜底
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentKind::CrossDepartment => write!(f, "CROSS_DEPARTMENT"),
            AssignmentKind::SameDepartment => write!(f, "SAME_DEPARTMENT"),
        }
    }
}
