// ==========================================
// 项目评审排期系统 - 报表引擎
// ==========================================
// 职责: 月度排期 / 评审人负载 / 逾期告警 三类报表的数据组装与 CSV 导出
// 说明: 只读三张实体集，不做任何写回；图表渲染不在此处
// ==========================================

use crate::domain::{Project, ProjectStatus, Review, User};
use crate::repository::record::format_date;
use crate::repository::RepositoryResult;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const UNKNOWN: &str = "Unknown";
const NO_REVIEWER_ASSIGNED: &str = "No reviewer assigned";

// ==========================================
// 报表行
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "Review_ID")]
    pub review_id: String,
    #[serde(rename = "Project_ID")]
    pub project_id: String,
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Reviewer_ID")]
    pub reviewer_id: String,
    #[serde(rename = "Reviewer_Name")]
    pub reviewer_name: String,
    #[serde(rename = "Scheduled_Date")]
    pub scheduled_date: NaiveDate,
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRow {
    #[serde(rename = "User_ID")]
    pub user_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Current_Load")]
    pub active_count: usize,
    #[serde(rename = "Active_Reviews")]
    pub active_reviews: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueRow {
    #[serde(rename = "Project_ID")]
    pub project_id: String,
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Next_Review_Date")]
    pub next_review_date: Option<NaiveDate>,
    #[serde(rename = "Days_Overdue")]
    pub days_overdue: i64,
    #[serde(rename = "Reviewer_Name")]
    pub reviewer_name: String,
}

// ==========================================
// ReportEngine
// ==========================================
pub struct ReportEngine<'a> {
    projects: &'a [Project],
    users: &'a [User],
    reviews: &'a [Review],
}

impl<'a> ReportEngine<'a> {
    pub fn new(projects: &'a [Project], users: &'a [User], reviews: &'a [Review]) -> Self {
        Self {
            projects,
            users,
            reviews,
        }
    }

    fn project(&self, project_id: &str) -> Option<&'a Project> {
        self.projects.iter().find(|p| p.project_id == project_id)
    }

    fn user(&self, user_id: &str) -> Option<&'a User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    /// 月度排期: 指定年月内的活跃评审，按排期日升序
    pub fn monthly_schedule(&self, year: i32, month: u32) -> Vec<ScheduleRow> {
        let mut rows: Vec<ScheduleRow> = self
            .reviews
            .iter()
            .filter(|r| r.is_active())
            .filter(|r| r.scheduled_date.year() == year && r.scheduled_date.month() == month)
            .map(|r| ScheduleRow {
                review_id: r.review_id.clone(),
                project_id: r.project_id.clone(),
                project_name: self
                    .project(&r.project_id)
                    .map(|p| p.project_name.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                reviewer_id: r.reviewer_id.clone(),
                reviewer_name: self
                    .user(&r.reviewer_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                scheduled_date: r.scheduled_date,
                status: r.status.as_str().to_string(),
            })
            .collect();

        rows.sort_by_key(|r| r.scheduled_date);
        rows
    }

    /// 负载报表: 按活跃评审数降序（相同数量保持用户原顺序）
    ///
    /// 活跃数由评审记录现算，可与 Current_Load 对照
    pub fn workload(&self) -> Vec<WorkloadRow> {
        let mut active: HashMap<&str, Vec<String>> = HashMap::new();
        for review in self.reviews.iter().filter(|r| r.is_active()) {
            active
                .entry(review.reviewer_id.as_str())
                .or_default()
                .push(review.review_id.clone());
        }

        let mut rows: Vec<WorkloadRow> = self
            .users
            .iter()
            .map(|u| {
                let active_reviews = active.remove(u.user_id.as_str()).unwrap_or_default();
                WorkloadRow {
                    user_id: u.user_id.clone(),
                    name: u.name.clone(),
                    department: u.department.clone(),
                    active_count: active_reviews.len(),
                    active_reviews,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.active_count.cmp(&a.active_count));
        rows
    }

    /// 逾期告警: Overdue 项目按下次评审日升序
    ///
    /// 有活跃评审时取第一条的评审人并计算逾期天数；否则逾期天数记 0
    pub fn overdue_alerts(&self, reference_date: NaiveDate) -> Vec<OverdueRow> {
        let mut overdue: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.status == Some(ProjectStatus::Overdue))
            .collect();
        overdue.sort_by_key(|p| p.next_review_date);

        overdue
            .into_iter()
            .map(|p| {
                let active = self
                    .reviews
                    .iter()
                    .find(|r| r.project_id == p.project_id && r.is_active());

                let (reviewer_name, days_overdue) = match active {
                    Some(review) => (
                        self.user(&review.reviewer_id)
                            .map(|u| u.name.clone())
                            .unwrap_or_else(|| UNKNOWN.to_string()),
                        p.next_review_date
                            .map(|d| (reference_date - d).num_days())
                            .unwrap_or(0),
                    ),
                    None => (NO_REVIEWER_ASSIGNED.to_string(), 0),
                };

                OverdueRow {
                    project_id: p.project_id.clone(),
                    project_name: p.project_name.clone(),
                    department: p.department.clone(),
                    next_review_date: p.next_review_date,
                    days_overdue,
                    reviewer_name,
                }
            })
            .collect()
    }
}

// ==========================================
// CSV 导出
// ==========================================

/// 月度排期导出（列: Project_ID, Project_Name, Reviewer_Name, Scheduled_Date, Status）
pub fn write_schedule_csv(path: &Path, rows: &[ScheduleRow]) -> RepositoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Project_ID",
        "Project_Name",
        "Reviewer_Name",
        "Scheduled_Date",
        "Status",
    ])?;
    for row in rows {
        writer.write_record([
            row.project_id.as_str(),
            row.project_name.as_str(),
            row.reviewer_name.as_str(),
            format_date(row.scheduled_date).as_str(),
            row.status.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_workload_csv(path: &Path, rows: &[WorkloadRow]) -> RepositoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["User_ID", "Name", "Department", "Current_Load", "Active_Reviews"])?;
    for row in rows {
        writer.write_record([
            row.user_id.clone(),
            row.name.clone(),
            row.department.clone(),
            row.active_count.to_string(),
            row.active_reviews.join(";"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_overdue_csv(path: &Path, rows: &[OverdueRow]) -> RepositoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Project_ID",
        "Project_Name",
        "Department",
        "Next_Review_Date",
        "Days_Overdue",
        "Reviewer_Name",
    ])?;
    for row in rows {
        writer.write_record([
            row.project_id.clone(),
            row.project_name.clone(),
            row.department.clone(),
            row.next_review_date.map(format_date).unwrap_or_default(),
            row.days_overdue.to_string(),
            row.reviewer_name.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
