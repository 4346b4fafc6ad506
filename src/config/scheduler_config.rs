// ==========================================
// 项目评审排期系统 - 运行配置
// ==========================================
// 来源优先级: 环境变量 > JSON 配置文件 > 内置默认值
// ==========================================

use crate::engine::assignment::DEFAULT_SCHEDULE_OFFSET_DAYS;
use crate::engine::due_date::DEFAULT_DUE_SOON_WINDOW_DAYS;
use crate::engine::review_id::ReviewIdStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 配置键（环境变量名）
// ==========================================
pub mod config_keys {
    /// 配置文件路径
    pub const ENV_CONFIG: &str = "REVIEW_SCHEDULER_CONFIG";
    /// 数据目录
    pub const ENV_DATA_DIR: &str = "REVIEW_SCHEDULER_DATA_DIR";
    /// 存储后端: csv | sqlite
    pub const ENV_BACKEND: &str = "REVIEW_SCHEDULER_BACKEND";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置项无效: {0}")]
    Invalid(String),
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Csv,
    Sqlite,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(StoreBackend::Csv),
            "sqlite" => Some(StoreBackend::Sqlite),
            _ => None,
        }
    }
}

// ==========================================
// SchedulerConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub data_dir: PathBuf,
    pub projects_file: String,
    pub users_file: String,
    pub reviews_file: String,
    pub backend: StoreBackend,
    pub sqlite_file: String,
    /// “即将到期”窗口（天）
    pub due_soon_window_days: i64,
    /// 新评审排期偏移（天）
    pub schedule_offset_days: u64,
    /// CSV 覆盖写入前备份
    pub backup_on_write: bool,
    pub review_id_strategy: ReviewIdStrategy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            projects_file: "Projects.csv".to_string(),
            users_file: "Users.csv".to_string(),
            reviews_file: "Reviews.csv".to_string(),
            backend: StoreBackend::Csv,
            sqlite_file: "review_scheduler.db".to_string(),
            due_soon_window_days: DEFAULT_DUE_SOON_WINDOW_DAYS,
            schedule_offset_days: DEFAULT_SCHEDULE_OFFSET_DAYS,
            backup_on_write: true,
            review_id_strategy: ReviewIdStrategy::Sequential,
        }
    }
}

impl SchedulerConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置文件；为 None 时读取 REVIEW_SCHEDULER_CONFIG，仍无则用默认值
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(config_keys::ENV_CONFIG)
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// 从 JSON 文本解析，缺省字段取默认值
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 应用覆写（lookup 通常为环境变量读取）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(config_keys::ENV_DATA_DIR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(config_keys::ENV_BACKEND) {
            match StoreBackend::parse(&raw) {
                Some(backend) => self.backend = backend,
                None => tracing::warn!(value = %raw, "无法识别的存储后端，沿用配置值"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.due_soon_window_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "due_soon_window_days 不能为负数: {}",
                self.due_soon_window_days
            )));
        }
        if self.schedule_offset_days == 0 {
            return Err(ConfigError::Invalid(
                "schedule_offset_days 必须大于 0".to_string(),
            ));
        }
        for (name, value) in [
            ("projects_file", &self.projects_file),
            ("users_file", &self.users_file),
            ("reviews_file", &self.reviews_file),
            ("sqlite_file", &self.sqlite_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} 不能为空", name)));
            }
        }
        Ok(())
    }

    pub fn projects_path(&self) -> PathBuf {
        self.data_dir.join(&self.projects_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.data_dir.join(&self.reviews_file)
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(&self.sqlite_file)
    }
}

/// 默认数据目录
///
/// 优先使用用户数据目录，拿不到时回退到当前目录
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("project-review-scheduler"),
        None => PathBuf::from("."),
    }
}
