// ==========================================
// 项目评审排期系统 - 表格记录编解码
// ==========================================
// 职责: 在存储边界把字符串行转换为强类型实体
// 格式: 日期统一 YYYY-MM-DD，空字符串表示空值
// ==========================================

use crate::domain::{Project, ProjectStatus, Review, ReviewStatus, User};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use std::collections::HashMap;

/// 原始行（列名 -> 文本值）
pub type RawRecord = HashMap<String, String>;

/// 日期文本格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub mod columns {
    pub const PROJECT: &[&str] = &[
        "Project_ID",
        "Project_Name",
        "Start_Date",
        "Last_Review_Date",
        "Review_Frequency_Years",
        "Department",
        "Status",
        "Next_Review_Date",
    ];

    pub const USER: &[&str] = &["User_ID", "Name", "Email", "Department", "Current_Load"];

    pub const REVIEW: &[&str] = &[
        "Review_ID",
        "Project_ID",
        "Reviewer_ID",
        "Scheduled_Date",
        "Status",
        "Completion_Date",
    ];
}

// ==========================================
// Record Trait
// ==========================================

/// 可按主键存取的表格记录
pub trait Record: Clone + Send + 'static {
    /// 实体名（用于错误信息与日志）
    const ENTITY: &'static str;
    /// 表头（第一列为主键）
    const HEADERS: &'static [&'static str];

    fn key(&self) -> &str;

    /// 按 HEADERS 顺序输出各列文本
    fn to_row(&self) -> Vec<String>;

    fn from_raw(raw: &RawRecord) -> RepositoryResult<Self>;

    /// 按 HEADERS 顺序解析一行
    fn from_row(values: &[String]) -> RepositoryResult<Self> {
        let raw: RawRecord = Self::HEADERS
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.to_string(), v.trim().to_string()))
            .collect();
        Self::from_raw(&raw)
    }
}

// ==========================================
// 字段解析辅助
// ==========================================

struct FieldReader<'a> {
    entity: &'static str,
    key: String,
    raw: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    fn new(entity: &'static str, key_field: &str, raw: &'a RawRecord) -> RepositoryResult<Self> {
        let key = raw
            .get(key_field)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if key.is_empty() {
            return Err(RepositoryError::data_format(
                entity,
                "<missing>",
                key_field,
                "",
                "主键缺失",
            ));
        }
        Ok(Self { entity, key, raw })
    }

    fn text(&self, field: &str) -> &str {
        self.raw.get(field).map(|v| v.trim()).unwrap_or("")
    }

    fn error(&self, field: &str, value: &str, message: impl Into<String>) -> RepositoryError {
        RepositoryError::data_format(self.entity, &self.key, field, value, message)
    }

    fn required_date(&self, field: &str) -> RepositoryResult<NaiveDate> {
        let value = self.text(field);
        if value.is_empty() {
            return Err(self.error(field, value, "必填日期为空"));
        }
        parse_date(value).ok_or_else(|| self.error(field, value, "期望 YYYY-MM-DD"))
    }

    fn optional_date(&self, field: &str) -> RepositoryResult<Option<NaiveDate>> {
        let value = self.text(field);
        if value.is_empty() {
            return Ok(None);
        }
        parse_date(value)
            .map(Some)
            .ok_or_else(|| self.error(field, value, "期望 YYYY-MM-DD"))
    }

    fn decimal(&self, field: &str) -> RepositoryResult<f64> {
        let value = self.text(field);
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(field, value, "不是有效的数值"))
    }
}

/// 解析日期；兼容带时间部分的文本（仅取日期）
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// 负载值容错: 只接受十进制整数，负数按 0 处理
///
/// # 返回
/// - None: 非整数（如 "2.0"、"abc"）或超出 u32 范围，调用方按 0 处理
pub fn coerce_load(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0);
    }
    let n = value.parse::<i64>().ok()?;
    u32::try_from(n.max(0)).ok()
}

// ==========================================
// Project
// ==========================================
impl Record for Project {
    const ENTITY: &'static str = "Project";
    const HEADERS: &'static [&'static str] = columns::PROJECT;

    fn key(&self) -> &str {
        &self.project_id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.project_id.clone(),
            self.project_name.clone(),
            format_date(self.start_date),
            format_optional_date(self.last_review_date),
            self.review_frequency_years.to_string(),
            self.department.clone(),
            self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            format_optional_date(self.next_review_date),
        ]
    }

    fn from_raw(raw: &RawRecord) -> RepositoryResult<Self> {
        let r = FieldReader::new(Self::ENTITY, "Project_ID", raw)?;

        // 缓存字段: 无法识别的状态视为未计算，下次重算时覆盖
        let status_text = r.text("Status");
        let status = ProjectStatus::parse(status_text);
        if status.is_none() && !status_text.is_empty() {
            tracing::warn!(
                project_id = %r.key,
                status = status_text,
                "无法识别的项目状态，按未计算处理"
            );
        }

        Ok(Project {
            project_id: r.key.clone(),
            project_name: r.text("Project_Name").to_string(),
            start_date: r.required_date("Start_Date")?,
            last_review_date: r.optional_date("Last_Review_Date")?,
            review_frequency_years: r.decimal("Review_Frequency_Years")?,
            department: r.text("Department").to_string(),
            status,
            next_review_date: r.optional_date("Next_Review_Date")?,
        })
    }
}

// ==========================================
// User
// ==========================================
impl Record for User {
    const ENTITY: &'static str = "User";
    const HEADERS: &'static [&'static str] = columns::USER;

    fn key(&self) -> &str {
        &self.user_id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.department.clone(),
            self.current_load.to_string(),
        ]
    }

    fn from_raw(raw: &RawRecord) -> RepositoryResult<Self> {
        let r = FieldReader::new(Self::ENTITY, "User_ID", raw)?;

        let load_text = r.text("Current_Load");
        let current_load = coerce_load(load_text).unwrap_or_else(|| {
            tracing::warn!(
                user_id = %r.key,
                current_load = load_text,
                "Current_Load 无法解析，按 0 处理"
            );
            0
        });

        Ok(User {
            user_id: r.key.clone(),
            name: r.text("Name").to_string(),
            email: r.text("Email").to_string(),
            department: r.text("Department").to_string(),
            current_load,
        })
    }
}

// ==========================================
// Review
// ==========================================
impl Record for Review {
    const ENTITY: &'static str = "Review";
    const HEADERS: &'static [&'static str] = columns::REVIEW;

    fn key(&self) -> &str {
        &self.review_id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.review_id.clone(),
            self.project_id.clone(),
            self.reviewer_id.clone(),
            format_date(self.scheduled_date),
            self.status.as_str().to_string(),
            format_optional_date(self.completion_date),
        ]
    }

    fn from_raw(raw: &RawRecord) -> RepositoryResult<Self> {
        let r = FieldReader::new(Self::ENTITY, "Review_ID", raw)?;

        let status_text = r.text("Status");
        let status = ReviewStatus::parse(status_text)
            .ok_or_else(|| r.error("Status", status_text, "未知的评审状态"))?;

        Ok(Review {
            review_id: r.key.clone(),
            project_id: r.text("Project_ID").to_string(),
            reviewer_id: r.text("Reviewer_ID").to_string(),
            scheduled_date: r.required_date("Scheduled_Date")?,
            status,
            completion_date: r.optional_date("Completion_Date")?,
        })
    }
}
