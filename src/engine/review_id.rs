// ==========================================
// 项目评审排期系统 - 评审编号生成
// ==========================================
// 约束: 同一批次（甚至同一秒）内生成的编号也必须唯一
// 做法: 生成前先登记已有编号，生成时跳过已占用值
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 评审编号生成器
pub trait ReviewIdGenerator {
    /// 登记已存在的编号
    fn reserve(&mut self, review_id: &str);

    /// 生成下一个未被占用的编号
    fn next_id(&mut self, reference_date: NaiveDate) -> String;
}

/// 编号策略（配置项）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewIdStrategy {
    /// R{YYYYMMDD}-{序号:03}
    #[default]
    Sequential,
    /// R-{uuid v4}
    Uuid,
}

impl ReviewIdStrategy {
    pub fn generator(&self) -> Box<dyn ReviewIdGenerator> {
        match self {
            ReviewIdStrategy::Sequential => Box::new(SequentialReviewIds::new()),
            ReviewIdStrategy::Uuid => Box::new(UuidReviewIds::new()),
        }
    }
}

// ==========================================
// 按基准日递增的序号编号
// ==========================================
#[derive(Debug, Default)]
pub struct SequentialReviewIds {
    taken: HashSet<String>,
    counters: HashMap<NaiveDate, u32>,
}

impl SequentialReviewIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewIdGenerator for SequentialReviewIds {
    fn reserve(&mut self, review_id: &str) {
        self.taken.insert(review_id.to_string());
    }

    fn next_id(&mut self, reference_date: NaiveDate) -> String {
        let prefix = reference_date.format("%Y%m%d").to_string();
        let counter = self.counters.entry(reference_date).or_insert(0);
        loop {
            *counter += 1;
            let id = format!("R{}-{:03}", prefix, counter);
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

// ==========================================
// UUID 编号
// ==========================================
#[derive(Debug, Default)]
pub struct UuidReviewIds {
    taken: HashSet<String>,
}

impl UuidReviewIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewIdGenerator for UuidReviewIds {
    fn reserve(&mut self, review_id: &str) {
        self.taken.insert(review_id.to_string());
    }

    fn next_id(&mut self, _reference_date: NaiveDate) -> String {
        loop {
            let id = format!("R-{}", Uuid::new_v4());
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}
