// ==========================================
// 项目评审排期系统 - 评审到期计算引擎
// ==========================================
// 职责: 由上次评审日 + 评审周期推导下次评审日与三态状态
// 输入: Project 列表 + 基准日
// 输出: 更新 Project.status / Project.next_review_date
// 红线: 基准日由调用方显式传入，引擎内不读系统时钟
// ==========================================

use crate::domain::{Project, ProjectStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::RecordStore;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 默认“即将到期”窗口（天）
pub const DEFAULT_DUE_SOON_WINDOW_DAYS: i64 = 30;

/// 单个项目的到期判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueStatus {
    pub next_review_date: NaiveDate,
    pub status: ProjectStatus,
    /// next_review_date - 基准日（天），负数表示已逾期
    pub days_until: i64,
}

/// 状态计数汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub overdue: usize,
    pub due_soon: usize,
    pub up_to_date: usize,
    pub total: usize,
}

impl StatusSummary {
    fn record(&mut self, status: ProjectStatus) {
        match status {
            ProjectStatus::Overdue => self.overdue += 1,
            ProjectStatus::DueSoon => self.due_soon += 1,
            ProjectStatus::UpToDate => self.up_to_date += 1,
        }
        self.total += 1;
    }
}

/// 一次全量重算的结果
#[derive(Debug, Clone)]
pub struct DueDateRun {
    pub projects: Vec<Project>,
    pub summary: StatusSummary,
}

// ==========================================
// DueDateEngine - 到期计算引擎
// ==========================================
pub struct DueDateEngine {
    due_soon_window_days: i64,
}

impl DueDateEngine {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_DUE_SOON_WINDOW_DAYS)
    }

    /// 自定义“即将到期”窗口
    pub fn with_window(due_soon_window_days: i64) -> Self {
        Self {
            due_soon_window_days,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 评审周期（年）换算为整月数
    ///
    /// 规则: floor(years * 12)，小数周期按截断处理（0.5 年 -> 6 个月，
    /// 0.99 年 -> 11 个月），不做四舍五入
    ///
    /// # 返回
    /// - None: 周期非正数或非有限值
    pub fn frequency_to_months(years: f64) -> Option<u32> {
        if !years.is_finite() || years <= 0.0 {
            return None;
        }
        let months = (years * 12.0).floor();
        if months > u32::MAX as f64 {
            return None;
        }
        Some(months as u32)
    }

    /// 按天数差判定状态
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) days_until < 0 -> Overdue
    /// 2) days_until <= 窗口 -> Due Soon
    /// 3) 其他 -> Up to Date
    pub fn classify(&self, days_until: i64) -> ProjectStatus {
        if days_until < 0 {
            ProjectStatus::Overdue
        } else if days_until <= self.due_soon_window_days {
            ProjectStatus::DueSoon
        } else {
            ProjectStatus::UpToDate
        }
    }

    /// 单个项目到期判定
    ///
    /// 下次评审日 = 基准日期（上次评审日，未评审过则为开始日）+ 整月数，
    /// 月份加法按日历处理：保留日号，月末溢出时取当月最后一天
    pub fn compute_due_status(
        &self,
        project: &Project,
        reference_date: NaiveDate,
    ) -> EngineResult<DueStatus> {
        let months = Self::frequency_to_months(project.review_frequency_years).ok_or_else(|| {
            EngineError::project_format(
                &project.project_id,
                "Review_Frequency_Years",
                format!(
                    "评审周期必须为正数，实际 {}",
                    project.review_frequency_years
                ),
            )
        })?;

        let anchor = project.review_anchor_date();
        let next_review_date = anchor
            .checked_add_months(Months::new(months))
            .ok_or_else(|| {
                EngineError::project_format(
                    &project.project_id,
                    "Review_Frequency_Years",
                    format!("{} 加 {} 个月超出日期范围", anchor, months),
                )
            })?;

        let days_until = (next_review_date - reference_date).num_days();

        Ok(DueStatus {
            next_review_date,
            status: self.classify(days_until),
            days_until,
        })
    }

    /// 批量重算（纯函数，不落库）
    ///
    /// 任一项目格式错误即整体失败，不返回部分结果
    #[instrument(skip(self, projects), fields(count = projects.len()))]
    pub fn evaluate_batch(
        &self,
        projects: Vec<Project>,
        reference_date: NaiveDate,
    ) -> EngineResult<DueDateRun> {
        let mut summary = StatusSummary::default();
        let mut updated = Vec::with_capacity(projects.len());

        for mut project in projects {
            let due = self.compute_due_status(&project, reference_date)?;

            project.next_review_date = Some(due.next_review_date);
            project.status = Some(due.status);
            summary.record(due.status);

            tracing::debug!(
                project_id = %project.project_id,
                next_review_date = %due.next_review_date,
                days_until = due.days_until,
                status = %due.status,
                "项目到期判定"
            );

            updated.push(project);
        }

        Ok(DueDateRun {
            projects: updated,
            summary,
        })
    }

    /// 全量重算并写回项目实体集
    ///
    /// 读取失败或任一项目格式错误时中止，不写入任何状态
    #[instrument(skip(self, store))]
    pub fn calculate_all_reviews(
        &self,
        store: &dyn RecordStore<Project>,
        reference_date: NaiveDate,
    ) -> EngineResult<DueDateRun> {
        let projects = store.read_all()?;
        let run = self.evaluate_batch(projects, reference_date)?;

        store.write_all(&run.projects)?;

        tracing::info!(
            total = run.summary.total,
            overdue = run.summary.overdue,
            due_soon = run.summary.due_soon,
            up_to_date = run.summary.up_to_date,
            "评审到期计算完成"
        );

        Ok(run)
    }
}

impl Default for DueDateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project(last_review: NaiveDate, years: f64) -> Project {
        Project {
            project_id: "P001".to_string(),
            project_name: "Security Review".to_string(),
            start_date: date(2024, 1, 1),
            last_review_date: Some(last_review),
            review_frequency_years: years,
            department: "IT".to_string(),
            status: None,
            next_review_date: None,
        }
    }

    #[test]
    fn test_half_year_frequency() {
        let engine = DueDateEngine::new();
        let due = engine
            .compute_due_status(&project(date(2025, 1, 1), 0.5), date(2025, 6, 1))
            .unwrap();

        assert_eq!(due.next_review_date, date(2025, 7, 1));
        assert_eq!(due.status, ProjectStatus::DueSoon);
        assert_eq!(due.days_until, 30);
    }

    #[test]
    fn test_frequency_truncates_to_whole_months() {
        let cases = [
            (0.5, Some(6)),
            (1.0, Some(12)),
            (2.0, Some(24)),
            (0.25, Some(3)),
            (0.99, Some(11)),
            (1.1, Some(13)),
            (0.05, Some(0)),
            (0.0, None),
            (-1.0, None),
            (f64::NAN, None),
        ];
        for (years, expected) in cases {
            assert_eq!(
                DueDateEngine::frequency_to_months(years),
                expected,
                "years={years}"
            );
        }
    }

    #[test]
    fn test_status_boundaries() {
        let engine = DueDateEngine::new();
        // 下次评审日: 2025-07-01
        let p = project(date(2025, 1, 1), 0.5);

        let on_day = engine.compute_due_status(&p, date(2025, 7, 1)).unwrap();
        assert_eq!(on_day.days_until, 0);
        assert_eq!(on_day.status, ProjectStatus::DueSoon);

        let day_after = engine.compute_due_status(&p, date(2025, 7, 2)).unwrap();
        assert_eq!(day_after.days_until, -1);
        assert_eq!(day_after.status, ProjectStatus::Overdue);

        let far = engine.compute_due_status(&p, date(2025, 5, 31)).unwrap();
        assert_eq!(far.days_until, 31);
        assert_eq!(far.status, ProjectStatus::UpToDate);
    }

    #[test]
    fn test_month_end_clamping() {
        let engine = DueDateEngine::new();
        let due = engine
            .compute_due_status(&project(date(2024, 8, 31), 0.5), date(2024, 1, 1))
            .unwrap();
        assert_eq!(due.next_review_date, date(2025, 2, 28));

        let due = engine
            .compute_due_status(&project(date(2023, 8, 31), 0.5), date(2024, 1, 1))
            .unwrap();
        assert_eq!(due.next_review_date, date(2024, 2, 29));
    }

    #[test]
    fn test_never_reviewed_uses_start_date() {
        let engine = DueDateEngine::new();
        let mut p = project(date(2025, 1, 1), 1.0);
        p.last_review_date = None;
        p.start_date = date(2024, 3, 15);

        let due = engine.compute_due_status(&p, date(2025, 1, 1)).unwrap();
        assert_eq!(due.next_review_date, date(2025, 3, 15));
        assert_eq!(due.status, ProjectStatus::UpToDate);
    }

    #[test]
    fn test_non_positive_frequency_is_format_error() {
        let engine = DueDateEngine::new();
        let err = engine
            .compute_due_status(&project(date(2025, 1, 1), 0.0), date(2025, 1, 1))
            .unwrap_err();
        match err {
            EngineError::DataFormat { key, field, .. } => {
                assert_eq!(key, "P001");
                assert_eq!(field, "Review_Frequency_Years");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_window() {
        let engine = DueDateEngine::with_window(7);
        assert_eq!(engine.classify(7), ProjectStatus::DueSoon);
        assert_eq!(engine.classify(8), ProjectStatus::UpToDate);
    }

    #[test]
    fn test_evaluate_batch_summary() {
        let engine = DueDateEngine::new();
        let reference = date(2025, 6, 1);
        let projects = vec![
            project(date(2024, 1, 1), 1.0),  // 2025-01-01 -> Overdue
            project(date(2025, 1, 1), 0.5),  // 2025-07-01 -> Due Soon
            project(date(2025, 1, 1), 1.0),  // 2026-01-01 -> Up to Date
        ];

        let run = engine.evaluate_batch(projects, reference).unwrap();
        assert_eq!(
            run.summary,
            StatusSummary {
                overdue: 1,
                due_soon: 1,
                up_to_date: 1,
                total: 3,
            }
        );
        assert!(run.projects.iter().all(|p| p.status.is_some()));
    }
}
