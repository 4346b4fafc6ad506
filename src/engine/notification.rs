// ==========================================
// 项目评审排期系统 - 评审通知
// ==========================================
// 职责: 为活跃评审组装通知消息，交给外部 NotificationSink 投递
// 说明: 引擎层定义 trait，投递方式（邮件/日志/队列）由调用方实现
// ==========================================

use crate::domain::{Project, ProjectStatus, Review, User};
use crate::repository::record::format_date;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::instrument;

/// 结构化通知消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub to: String,
    pub reviewer_name: String,
    pub subject: String,
    pub body: String,
    pub project_id: String,
    pub review_id: String,
    pub urgent: bool,
}

/// 通知投递 Trait
pub trait NotificationSink {
    fn send(&self, message: &NotificationMessage) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 只写日志的投递实现（开发/演练用）
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn send(&self, message: &NotificationMessage) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            review_id = %message.review_id,
            "通知（仅记录日志，未实际发送）"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub project_id: String,
    pub review_id: String,
    pub status: DeliveryStatus,
    pub reviewer_email: Option<String>,
    pub subject: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub log: Vec<NotificationLogEntry>,
}

// ==========================================
// 消息组装
// ==========================================

/// 组装单条通知
///
/// 主题: "<项目名> - Review Required"，逾期项目加 "[URGENT] " 前缀
pub fn build_message(project: &Project, review: &Review, reviewer: &User) -> NotificationMessage {
    let urgent = project.status == Some(ProjectStatus::Overdue);

    let mut subject = format!("{} - Review Required", project.project_name);
    if urgent {
        subject = format!("[URGENT] {}", subject);
    }

    let status_text = project.status.map(|s| s.as_str()).unwrap_or("");
    let mut body = format!(
        "Dear {},\n\n\
         You have been assigned to review the following project:\n\n\
         Project: {}\n\
         Project ID: {}\n\
         Scheduled Date: {}\n\
         Status: {}\n\n",
        reviewer.name,
        project.project_name,
        project.project_id,
        format_date(review.scheduled_date),
        status_text,
    );
    match project.status {
        Some(ProjectStatus::Overdue) => {
            body.push_str("This review is OVERDUE and requires immediate attention.\n")
        }
        Some(ProjectStatus::DueSoon) => {
            body.push_str("This review is due soon. Please prioritize accordingly.\n")
        }
        _ => {}
    }
    body.push_str("\nPlease complete your review by the scheduled date.\n\nThank you,\nProject Review Scheduler\n");

    NotificationMessage {
        to: reviewer.email.clone(),
        reviewer_name: reviewer.name.clone(),
        subject,
        body,
        project_id: project.project_id.clone(),
        review_id: review.review_id.clone(),
        urgent,
    }
}

// ==========================================
// NotificationDispatcher
// ==========================================
pub struct NotificationDispatcher<'a> {
    sink: &'a dyn NotificationSink,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(sink: &'a dyn NotificationSink) -> Self {
        Self { sink }
    }

    /// 为（可按项目状态过滤的）项目的每条活跃评审投递通知
    ///
    /// 评审人缺失或无邮箱、投递失败都只记入日志，不中断
    #[instrument(skip_all, fields(projects = projects.len(), filter = ?status_filter))]
    pub fn dispatch(
        &self,
        projects: &[Project],
        users: &[User],
        reviews: &[Review],
        status_filter: Option<ProjectStatus>,
    ) -> NotificationSummary {
        let mut summary = NotificationSummary::default();

        let selected = projects
            .iter()
            .filter(|p| status_filter.map_or(true, |s| p.status == Some(s)));

        for project in selected {
            for review in reviews
                .iter()
                .filter(|r| r.project_id == project.project_id && r.is_active())
            {
                let reviewer = users
                    .iter()
                    .find(|u| u.user_id == review.reviewer_id)
                    .filter(|u| !u.email.trim().is_empty());

                let entry = match reviewer {
                    None => NotificationLogEntry {
                        project_id: project.project_id.clone(),
                        review_id: review.review_id.clone(),
                        status: DeliveryStatus::Failed,
                        reviewer_email: None,
                        subject: None,
                        reason: Some("Missing reviewer or email".to_string()),
                    },
                    Some(reviewer) => {
                        let message = build_message(project, review, reviewer);
                        match self.sink.send(&message) {
                            Ok(()) => NotificationLogEntry {
                                project_id: project.project_id.clone(),
                                review_id: review.review_id.clone(),
                                status: DeliveryStatus::Sent,
                                reviewer_email: Some(message.to),
                                subject: Some(message.subject),
                                reason: None,
                            },
                            Err(e) => NotificationLogEntry {
                                project_id: project.project_id.clone(),
                                review_id: review.review_id.clone(),
                                status: DeliveryStatus::Failed,
                                reviewer_email: Some(message.to),
                                subject: Some(message.subject),
                                reason: Some(e.to_string()),
                            },
                        }
                    }
                };

                match entry.status {
                    DeliveryStatus::Sent => summary.sent += 1,
                    DeliveryStatus::Failed => {
                        tracing::warn!(
                            project_id = %entry.project_id,
                            review_id = %entry.review_id,
                            reason = entry.reason.as_deref().unwrap_or(""),
                            "通知投递失败"
                        );
                        summary.failed += 1
                    }
                }
                summary.log.push(entry);
            }
        }

        summary.total = summary.sent + summary.failed;
        summary
    }
}
