// ==========================================
// 项目评审排期系统 - 评审人分配引擎
// ==========================================
// 职责: 为待评审项目挑选评审人并生成评审记录
// 策略: 负载优先 + 跨部门优先（同部门兜底），确定性，无随机
// 输入: 项目列表 + 评审人全集 + 已有评审记录
// 输出: 新增 Review + 更新 User.current_load
// ==========================================

use crate::domain::{AssignmentKind, Project, Review, User};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::review_id::{ReviewIdGenerator, SequentialReviewIds};
use crate::repository::RecordStore;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// 默认排期偏移（天）: scheduled_date = 基准日 + 偏移
pub const DEFAULT_SCHEDULE_OFFSET_DAYS: u64 = 30;

/// 无可用评审人时记录的失败原因
pub const NO_AVAILABLE_REVIEWERS: &str = "No available reviewers";

/// 评审人选择结果（指向评审人池中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewerChoice {
    pub index: usize,
    pub kind: AssignmentKind,
}

/// 单个项目分配失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFailure {
    pub project_id: String,
    pub reason: String,
}

/// 批量分配汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub total_assigned: usize,
    pub total_needing_review: usize,
    /// 需要评审但已有活跃评审的项目数
    pub already_assigned: usize,
    pub failed_assignments: usize,
    pub assignments: Vec<Review>,
    pub failures: Vec<AssignmentFailure>,
}

// ==========================================
// AssignmentEngine - 评审人分配引擎
// ==========================================
pub struct AssignmentEngine {
    schedule_offset_days: u64,
    id_generator: Box<dyn ReviewIdGenerator>,
}

impl AssignmentEngine {
    pub fn new() -> Self {
        Self {
            schedule_offset_days: DEFAULT_SCHEDULE_OFFSET_DAYS,
            id_generator: Box::new(SequentialReviewIds::new()),
        }
    }

    pub fn with_schedule_offset(mut self, days: u64) -> Self {
        self.schedule_offset_days = days;
        self
    }

    pub fn with_id_generator(mut self, generator: Box<dyn ReviewIdGenerator>) -> Self {
        self.id_generator = generator;
        self
    }

    // ==========================================
    // 选择策略
    // ==========================================

    /// 挑选评审人（纯函数）
    ///
    /// 规则:
    /// 1) 按 current_load 升序稳定排序（负载相同保持池中原顺序）
    /// 2) 优先取与项目不同部门的最低负载者
    /// 3) 不存在跨部门候选时，取全体最低负载者
    ///
    /// # 返回
    /// - None: 评审人池为空
    pub fn select_reviewer(project: &Project, reviewers: &[User]) -> Option<ReviewerChoice> {
        let mut order: Vec<usize> = (0..reviewers.len()).collect();
        order.sort_by_key(|&i| reviewers[i].current_load);

        if let Some(&index) = order
            .iter()
            .find(|&&i| reviewers[i].is_outside(&project.department))
        {
            return Some(ReviewerChoice {
                index,
                kind: AssignmentKind::CrossDepartment,
            });
        }

        order.first().map(|&index| ReviewerChoice {
            index,
            kind: AssignmentKind::SameDepartment,
        })
    }

    // ==========================================
    // 单项目分配
    // ==========================================

    /// 为单个项目分配评审人并落库
    ///
    /// 顺序: 更新评审人负载 -> 追加评审记录。
    /// 负载更新成功后才写回内存池，保证池与存储一致；
    /// 追加评审失败时不回滚已落库的负载。
    ///
    /// # 返回
    /// - Ok(None): 没有可用评审人（不是错误）
    pub fn assign_reviewer(
        &mut self,
        project: &Project,
        reviewers: &mut [User],
        user_store: &dyn RecordStore<User>,
        review_store: &dyn RecordStore<Review>,
        reference_date: NaiveDate,
    ) -> EngineResult<Option<Review>> {
        let choice = match Self::select_reviewer(project, reviewers) {
            Some(choice) => choice,
            None => {
                tracing::debug!(project_id = %project.project_id, "评审人池为空");
                return Ok(None);
            }
        };

        let scheduled_date = reference_date
            .checked_add_days(Days::new(self.schedule_offset_days))
            .ok_or_else(|| {
                EngineError::project_format(
                    &project.project_id,
                    "Scheduled_Date",
                    format!("{} 加 {} 天超出日期范围", reference_date, self.schedule_offset_days),
                )
            })?;

        let mut chosen = reviewers[choice.index].clone();
        chosen.current_load = chosen.current_load.saturating_add(1);
        user_store.update_by_key(&chosen.user_id, &chosen)?;
        reviewers[choice.index] = chosen;

        let chosen = &reviewers[choice.index];
        let review = Review::scheduled(
            self.id_generator.next_id(reference_date),
            &project.project_id,
            &chosen.user_id,
            scheduled_date,
        );
        review_store.append(&review)?;

        tracing::debug!(
            project_id = %project.project_id,
            project_department = %project.department,
            reviewer_id = %chosen.user_id,
            reviewer_department = %chosen.department,
            new_load = chosen.current_load,
            kind = %choice.kind,
            review_id = %review.review_id,
            "已分配评审人"
        );

        Ok(Some(review))
    }

    // ==========================================
    // 批量分配
    // ==========================================

    /// 为所有待评审项目分配评审人
    ///
    /// 规则:
    /// 1) 待评审: status ∈ {Overdue, Due Soon}
    /// 2) 已有活跃评审（Scheduled / In Progress）的项目排除，
    ///    活跃集合在批次开始前一次性计算
    /// 3) 按输入顺序逐个分配，共享同一个逐步更新的评审人池，
    ///    批次内后续分配可见前面的负载增量
    /// 4) 单个项目失败只记入失败清单，不中断批次
    #[instrument(skip_all, fields(projects = projects.len(), users = users.len(), reviews = reviews.len()))]
    pub fn assign_all_reviewers(
        &mut self,
        projects: &[Project],
        users: Vec<User>,
        reviews: &[Review],
        user_store: &dyn RecordStore<User>,
        review_store: &dyn RecordStore<Review>,
        reference_date: NaiveDate,
    ) -> AssignmentSummary {
        for review in reviews {
            self.id_generator.reserve(&review.review_id);
        }

        let needing_review: Vec<&Project> = projects.iter().filter(|p| p.needs_review()).collect();

        let active_project_ids: HashSet<&str> = reviews
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.project_id.as_str())
            .collect();

        let to_assign: Vec<&Project> = needing_review
            .iter()
            .copied()
            .filter(|p| !active_project_ids.contains(p.project_id.as_str()))
            .collect();

        let mut pool = users;
        let mut assignments = Vec::new();
        let mut failures = Vec::new();

        for project in &to_assign {
            match self.assign_reviewer(project, &mut pool, user_store, review_store, reference_date)
            {
                Ok(Some(review)) => assignments.push(review),
                Ok(None) => failures.push(AssignmentFailure {
                    project_id: project.project_id.clone(),
                    reason: NO_AVAILABLE_REVIEWERS.to_string(),
                }),
                Err(e) => {
                    tracing::warn!(
                        project_id = %project.project_id,
                        error = %e,
                        "项目分配失败，继续处理后续项目"
                    );
                    failures.push(AssignmentFailure {
                        project_id: project.project_id.clone(),
                        reason: format!("Assignment error: {}", e),
                    });
                }
            }
        }

        let summary = AssignmentSummary {
            total_assigned: assignments.len(),
            total_needing_review: needing_review.len(),
            already_assigned: needing_review.len() - to_assign.len(),
            failed_assignments: failures.len(),
            assignments,
            failures,
        };

        tracing::info!(
            total_needing_review = summary.total_needing_review,
            already_assigned = summary.already_assigned,
            total_assigned = summary.total_assigned,
            failed = summary.failed_assignments,
            "评审人分配完成"
        );

        summary
    }

    /// 从存储读取三张实体集后执行批量分配
    ///
    /// 初始读取失败是致命错误（没有可迭代的数据）
    pub fn run(
        &mut self,
        project_store: &dyn RecordStore<Project>,
        user_store: &dyn RecordStore<User>,
        review_store: &dyn RecordStore<Review>,
        reference_date: NaiveDate,
    ) -> EngineResult<AssignmentSummary> {
        let projects = project_store.read_all()?;
        let users = user_store.read_all()?;
        let reviews = review_store.read_all()?;

        Ok(self.assign_all_reviewers(
            &projects,
            users,
            &reviews,
            user_store,
            review_store,
            reference_date,
        ))
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}
