// ==========================================
// 项目评审排期系统 - 排期 API
// ==========================================
// 职责: 装配存储与引擎，对外提供到期计算 / 分配 / 校验 / 报表 / 通知
// 基准日: 调用方未指定时才在此处取本地日期，引擎内部不读时钟
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{SchedulerConfig, StoreBackend};
use crate::db::{ensure_schema_version, open_sqlite_connection};
use crate::domain::{Project, ProjectStatus, Review, User};
use crate::engine::validation::{PROJECT_RULES, REVIEW_RULES, USER_RULES};
use crate::engine::{
    AssignmentEngine, AssignmentSummary, DueDateEngine, NotificationDispatcher, NotificationSink,
    NotificationSummary, OverdueRow, RecordValidator, ReportEngine, ScheduleRow, StatusSummary,
    ValidationReport, WorkloadRow,
};
use crate::repository::record::parse_date;
use crate::repository::{
    CsvRecordStore, Record, RecordStore, RepositoryError, RepositoryResult, SqliteRecordStore,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// 一次完整周期（先到期计算，再分配）的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub status: StatusSummary,
    pub assignment: AssignmentSummary,
}

// ==========================================
// 入口函数（直接作用于给定存储）
// ==========================================

/// 重算所有项目的下次评审日期与状态并写回
///
/// reference_date 为 None 时取本地当天
pub fn calculate_all_reviews(
    project_store: &dyn RecordStore<Project>,
    reference_date: Option<NaiveDate>,
) -> ApiResult<StatusSummary> {
    let run = DueDateEngine::new()
        .calculate_all_reviews(project_store, resolve_reference_date(reference_date))?;
    Ok(run.summary)
}

/// 为所有待评审且无活跃评审的项目分配评审人
pub fn assign_all_reviewers(
    project_store: &dyn RecordStore<Project>,
    user_store: &dyn RecordStore<User>,
    review_store: &dyn RecordStore<Review>,
    reference_date: Option<NaiveDate>,
) -> ApiResult<AssignmentSummary> {
    let summary = AssignmentEngine::new().run(
        project_store,
        user_store,
        review_store,
        resolve_reference_date(reference_date),
    )?;
    Ok(summary)
}

/// 未显式给出基准日时取本地当天
pub fn resolve_reference_date(reference_date: Option<NaiveDate>) -> NaiveDate {
    reference_date.unwrap_or_else(|| Local::now().date_naive())
}

/// 解析命令行/调用方传入的基准日（YYYY-MM-DD）
pub fn parse_reference_date(text: &str) -> ApiResult<NaiveDate> {
    parse_date(text).ok_or_else(|| {
        ApiError::InvalidInput(format!("无效日期 '{}'，应为 YYYY-MM-DD", text.trim()))
    })
}

// ==========================================
// SchedulerApi
// ==========================================

/// 排期 API
///
/// 职责：
/// 1. 按配置打开三张实体集（CSV 或 SQLite）
/// 2. 到期计算、评审人分配、完整周期
/// 3. 数据校验
/// 4. 报表与通知
pub struct SchedulerApi {
    config: SchedulerConfig,
    projects: Box<dyn RecordStore<Project>>,
    users: Box<dyn RecordStore<User>>,
    reviews: Box<dyn RecordStore<Review>>,
}

impl SchedulerApi {
    /// 按配置打开存储
    ///
    /// CSV 后端: 缺失的表格文件按表头创建
    /// SQLite 后端: 三张表共用一个连接
    pub fn open(config: SchedulerConfig) -> ApiResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            ApiError::Persistence(format!(
                "无法创建数据目录 {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let api = match config.backend {
            StoreBackend::Csv => {
                let projects = csv_store::<Project>(&config, config.projects_path())?;
                let users = csv_store::<User>(&config, config.users_path())?;
                let reviews = csv_store::<Review>(&config, config.reviews_path())?;
                Self::with_stores(config, projects, users, reviews)
            }
            StoreBackend::Sqlite => {
                let db_path = config.sqlite_path();
                let conn = open_sqlite_connection(&db_path.to_string_lossy())
                    .map_err(RepositoryError::from)?;
                ensure_schema_version(&conn).map_err(RepositoryError::from)?;
                let conn = Arc::new(Mutex::new(conn));

                let projects = Box::new(SqliteRecordStore::<Project>::from_connection(
                    conn.clone(),
                )?);
                let users = Box::new(SqliteRecordStore::<User>::from_connection(conn.clone())?);
                let reviews = Box::new(SqliteRecordStore::<Review>::from_connection(conn)?);
                Self::with_stores(config, projects, users, reviews)
            }
        };

        tracing::info!(
            backend = ?api.config.backend,
            data_dir = %api.config.data_dir.display(),
            "排期 API 已就绪"
        );
        Ok(api)
    }

    /// 使用调用方提供的存储（测试或自定义后端）
    pub fn with_stores(
        config: SchedulerConfig,
        projects: Box<dyn RecordStore<Project>>,
        users: Box<dyn RecordStore<User>>,
        reviews: Box<dyn RecordStore<Review>>,
    ) -> Self {
        Self {
            config,
            projects,
            users,
            reviews,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn due_date_engine(&self) -> DueDateEngine {
        DueDateEngine::with_window(self.config.due_soon_window_days)
    }

    fn assignment_engine(&self) -> AssignmentEngine {
        AssignmentEngine::new()
            .with_schedule_offset(self.config.schedule_offset_days)
            .with_id_generator(self.config.review_id_strategy.generator())
    }

    // ==========================================
    // 到期计算 / 分配
    // ==========================================

    #[instrument(skip(self))]
    pub fn calculate_reviews(&self, reference_date: Option<NaiveDate>) -> ApiResult<StatusSummary> {
        let date = resolve_reference_date(reference_date);
        let run = self
            .due_date_engine()
            .calculate_all_reviews(self.projects.as_ref(), date)?;
        Ok(run.summary)
    }

    #[instrument(skip(self))]
    pub fn assign_reviewers(
        &self,
        reference_date: Option<NaiveDate>,
    ) -> ApiResult<AssignmentSummary> {
        let date = resolve_reference_date(reference_date);
        let summary = self.assignment_engine().run(
            self.projects.as_ref(),
            self.users.as_ref(),
            self.reviews.as_ref(),
            date,
        )?;
        Ok(summary)
    }

    /// 完整周期: 到期计算成功后才进行分配，两步使用同一基准日
    #[instrument(skip(self))]
    pub fn run_cycle(&self, reference_date: Option<NaiveDate>) -> ApiResult<CycleSummary> {
        let date = resolve_reference_date(reference_date);
        let status = self.calculate_reviews(Some(date))?;
        let assignment = self.assign_reviewers(Some(date))?;
        Ok(CycleSummary { status, assignment })
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验三张实体集
    ///
    /// 字段级问题来自原始行；任一实体集存在无法解码的记录时
    /// 跳过引用完整性与负载一致性检查（字段级问题已覆盖原因）
    #[instrument(skip(self))]
    pub fn validate(&self) -> ApiResult<ValidationReport> {
        let mut report = ValidationReport::default();
        report.field_findings.extend(RecordValidator::validate_rows(
            Project::ENTITY,
            PROJECT_RULES,
            &self.projects.read_raw()?,
        ));
        report.field_findings.extend(RecordValidator::validate_rows(
            User::ENTITY,
            USER_RULES,
            &self.users.read_raw()?,
        ));
        report.field_findings.extend(RecordValidator::validate_rows(
            Review::ENTITY,
            REVIEW_RULES,
            &self.reviews.read_raw()?,
        ));

        let typed = (|| -> RepositoryResult<_> {
            Ok((
                self.projects.read_all()?,
                self.users.read_all()?,
                self.reviews.read_all()?,
            ))
        })();

        match typed {
            Ok((projects, users, reviews)) => {
                report.integrity_findings =
                    RecordValidator::validate_referential_integrity(&projects, &users, &reviews);
                report.load_findings = RecordValidator::validate_load_consistency(&users, &reviews);
            }
            Err(e) if e.is_data_format() => {
                tracing::warn!(error = %e, "存在无法解码的记录，跳过引用完整性检查");
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            findings = report.finding_count(),
            valid = report.is_valid(),
            "数据校验完成"
        );
        Ok(report)
    }

    // ==========================================
    // 报表
    // ==========================================

    pub fn monthly_schedule(&self, year: i32, month: u32) -> ApiResult<Vec<ScheduleRow>> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!(
                "月份必须在 1-12 之间: {}",
                month
            )));
        }
        let (projects, users, reviews) = self.load_all()?;
        Ok(ReportEngine::new(&projects, &users, &reviews).monthly_schedule(year, month))
    }

    pub fn workload_report(&self) -> ApiResult<Vec<WorkloadRow>> {
        let (projects, users, reviews) = self.load_all()?;
        Ok(ReportEngine::new(&projects, &users, &reviews).workload())
    }

    pub fn overdue_alerts(&self, reference_date: Option<NaiveDate>) -> ApiResult<Vec<OverdueRow>> {
        let date = resolve_reference_date(reference_date);
        let (projects, users, reviews) = self.load_all()?;
        Ok(ReportEngine::new(&projects, &users, &reviews).overdue_alerts(date))
    }

    // ==========================================
    // 通知
    // ==========================================

    /// 为活跃评审投递通知（可按项目缓存状态过滤）
    pub fn send_notifications(
        &self,
        status_filter: Option<ProjectStatus>,
        sink: &dyn NotificationSink,
    ) -> ApiResult<NotificationSummary> {
        let (projects, users, reviews) = self.load_all()?;
        Ok(NotificationDispatcher::new(sink).dispatch(&projects, &users, &reviews, status_filter))
    }

    fn load_all(&self) -> ApiResult<(Vec<Project>, Vec<User>, Vec<Review>)> {
        Ok((
            self.projects.read_all()?,
            self.users.read_all()?,
            self.reviews.read_all()?,
        ))
    }
}

fn csv_store<R: Record + 'static>(
    config: &SchedulerConfig,
    path: std::path::PathBuf,
) -> ApiResult<Box<dyn RecordStore<R>>> {
    let store = CsvRecordStore::<R>::new(path).with_backup(config.backup_on_write);
    store.ensure_exists()?;
    Ok(Box::new(store))
}
