// ==========================================
// 项目评审排期系统 - 数据校验
// ==========================================
// 职责:
// - 字段级校验（必填、日期格式、数值格式、主键重复）
// - 引用完整性（评审记录指向的项目/评审人必须存在）
// - 负载一致性（current_load 与活跃评审数比对）
// 红线: 只报告，不自动修正
// ==========================================

use crate::domain::{Project, Review, User};
use crate::repository::record::{coerce_load, parse_date, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// 字段规则
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Decimal,
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn rule(field: &'static str, kind: FieldKind, required: bool) -> FieldRule {
    FieldRule {
        field,
        kind,
        required,
    }
}

pub const PROJECT_RULES: &[FieldRule] = &[
    rule("Project_ID", FieldKind::Text, true),
    rule("Project_Name", FieldKind::Text, true),
    rule("Start_Date", FieldKind::Date, true),
    rule("Last_Review_Date", FieldKind::Date, false),
    rule("Review_Frequency_Years", FieldKind::Decimal, true),
    rule("Department", FieldKind::Text, true),
    rule("Next_Review_Date", FieldKind::Date, false),
];

pub const USER_RULES: &[FieldRule] = &[
    rule("User_ID", FieldKind::Text, true),
    rule("Name", FieldKind::Text, true),
    rule("Email", FieldKind::Text, true),
    rule("Department", FieldKind::Text, true),
    rule("Current_Load", FieldKind::Integer, false),
];

pub const REVIEW_RULES: &[FieldRule] = &[
    rule("Review_ID", FieldKind::Text, true),
    rule("Project_ID", FieldKind::Text, true),
    rule("Reviewer_ID", FieldKind::Text, true),
    rule("Scheduled_Date", FieldKind::Date, true),
    rule("Status", FieldKind::Text, true),
    rule("Completion_Date", FieldKind::Date, false),
];

// ==========================================
// 校验结果
// ==========================================

/// 字段级问题（row 为文件行号，表头为第 1 行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFinding {
    pub entity: String,
    pub row: usize,
    pub field: String,
    pub message: String,
}

/// 引用完整性问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityFinding {
    pub review_id: String,
    pub field: String,
    pub missing_id: String,
    pub message: String,
}

/// 负载不一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFinding {
    pub user_id: String,
    pub recorded_load: u32,
    pub active_reviews: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub field_findings: Vec<FieldFinding>,
    pub integrity_findings: Vec<IntegrityFinding>,
    pub load_findings: Vec<LoadFinding>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.field_findings.is_empty()
            && self.integrity_findings.is_empty()
            && self.load_findings.is_empty()
    }

    pub fn finding_count(&self) -> usize {
        self.field_findings.len() + self.integrity_findings.len() + self.load_findings.len()
    }
}

// ==========================================
// RecordValidator
// ==========================================
pub struct RecordValidator;

impl RecordValidator {
    /// 按规则校验原始行
    ///
    /// 第一条规则视为主键：除必填外还检查重复
    pub fn validate_rows(
        entity: &str,
        rules: &[FieldRule],
        rows: &[(usize, RawRecord)],
    ) -> Vec<FieldFinding> {
        let mut findings = Vec::new();
        let mut seen_keys = HashSet::new();
        let key_field = rules.first().map(|r| r.field);

        for (row, raw) in rows {
            let finding = |field: &str, message: String| FieldFinding {
                entity: entity.to_string(),
                row: *row,
                field: field.to_string(),
                message,
            };

            for rule in rules {
                let value = raw.get(rule.field).map(|v| v.trim()).unwrap_or("");

                if value.is_empty() {
                    if rule.required {
                        findings.push(finding(
                            rule.field,
                            format!("必填字段 '{}' 缺失或为空（第 {} 行）", rule.field, row),
                        ));
                    }
                    continue;
                }

                let problem = match rule.kind {
                    FieldKind::Text => None,
                    FieldKind::Date => parse_date(value)
                        .is_none()
                        .then(|| format!("'{}' 不是有效日期 (YYYY-MM-DD)", value)),
                    FieldKind::Decimal => value
                        .parse::<f64>()
                        .map_or(true, |v| !v.is_finite())
                        .then(|| format!("'{}' 不是有效数值", value)),
                    FieldKind::Integer => coerce_load(value)
                        .is_none()
                        .then(|| format!("'{}' 应为整数（0 - {}）", value, u32::MAX)),
                };
                if let Some(message) = problem {
                    findings.push(finding(
                        rule.field,
                        format!("字段 '{}' {}（第 {} 行）", rule.field, message, row),
                    ));
                }
            }

            if let Some(key_field) = key_field {
                let key = raw.get(key_field).map(|v| v.trim()).unwrap_or("");
                if !key.is_empty() && !seen_keys.insert(key.to_string()) {
                    findings.push(finding(key_field, format!("主键重复: {}", key)));
                }
            }
        }

        findings
    }

    /// 引用完整性: 每条评审的 Project_ID / Reviewer_ID 必须存在
    pub fn validate_referential_integrity(
        projects: &[Project],
        users: &[User],
        reviews: &[Review],
    ) -> Vec<IntegrityFinding> {
        let project_ids: HashSet<&str> = projects.iter().map(|p| p.project_id.as_str()).collect();
        let user_ids: HashSet<&str> = users.iter().map(|u| u.user_id.as_str()).collect();

        let mut findings = Vec::new();
        for review in reviews {
            if !project_ids.contains(review.project_id.as_str()) {
                findings.push(IntegrityFinding {
                    review_id: review.review_id.clone(),
                    field: "Project_ID".to_string(),
                    missing_id: review.project_id.clone(),
                    message: format!(
                        "Review {} references Project_ID: {} which does not exist",
                        review.review_id, review.project_id
                    ),
                });
            }
            if !user_ids.contains(review.reviewer_id.as_str()) {
                findings.push(IntegrityFinding {
                    review_id: review.review_id.clone(),
                    field: "Reviewer_ID".to_string(),
                    missing_id: review.reviewer_id.clone(),
                    message: format!(
                        "Review {} references Reviewer_ID: {} which does not exist",
                        review.review_id, review.reviewer_id
                    ),
                });
            }
        }
        findings
    }

    /// 负载一致性: current_load 应等于活跃评审数
    pub fn validate_load_consistency(users: &[User], reviews: &[Review]) -> Vec<LoadFinding> {
        let mut active: HashMap<&str, u32> = HashMap::new();
        for review in reviews.iter().filter(|r| r.is_active()) {
            *active.entry(review.reviewer_id.as_str()).or_insert(0) += 1;
        }

        users
            .iter()
            .filter_map(|user| {
                let active_reviews = active.get(user.user_id.as_str()).copied().unwrap_or(0);
                (active_reviews != user.current_load).then(|| LoadFinding {
                    user_id: user.user_id.clone(),
                    recorded_load: user.current_load,
                    active_reviews,
                })
            })
            .collect()
    }
}
