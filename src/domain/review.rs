// ==========================================
// 项目评审排期系统 - 评审记录实体
// ==========================================
// 职责: 记录一次分配决策（项目 x 评审人 的事实表）
// 红线: 只追加/更新，不删除
// ==========================================

use crate::domain::types::ReviewStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub project_id: String,
    pub reviewer_id: String,
    pub scheduled_date: NaiveDate,
    pub status: ReviewStatus,
    pub completion_date: Option<NaiveDate>,
}

impl Review {
    /// 创建一条新排期的评审（status = Scheduled，无完成日期）
    pub fn scheduled(
        review_id: String,
        project_id: &str,
        reviewer_id: &str,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            review_id,
            project_id: project_id.to_string(),
            reviewer_id: reviewer_id.to_string(),
            scheduled_date,
            status: ReviewStatus::Scheduled,
            completion_date: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
