// ==========================================
// 项目评审排期系统 - 项目实体
// ==========================================
// 职责: 项目主数据 + 评审状态缓存字段
// 红线: status / next_review_date 是缓存，不是事实来源
// ==========================================

use crate::domain::types::ProjectStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub start_date: NaiveDate,
    /// 从未评审过的项目为空，此时以 start_date 为基准
    pub last_review_date: Option<NaiveDate>,
    /// 评审周期（年），允许小数，如 0.5
    pub review_frequency_years: f64,
    pub department: String,

    // ===== 派生字段 =====
    pub status: Option<ProjectStatus>,
    pub next_review_date: Option<NaiveDate>,
}

impl Project {
    /// 评审周期的计算基准日
    pub fn review_anchor_date(&self) -> NaiveDate {
        self.last_review_date.unwrap_or(self.start_date)
    }

    /// 是否处于待评审状态
    pub fn needs_review(&self) -> bool {
        self.status.map(|s| s.needs_review()).unwrap_or(false)
    }
}
