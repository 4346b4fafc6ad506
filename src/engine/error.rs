// ==========================================
// 项目评审排期系统 - 引擎层错误类型
// ==========================================
// 分类:
// - DataFormat: 记录字段格式错误，中止本次运行
// - Persistence: 存储读写失败
// 无可用评审人不是错误（返回 None / 记入失败清单）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("数据格式错误: {entity} {key} 字段 {field}: {message}")]
    DataFormat {
        entity: String,
        key: String,
        field: String,
        message: String,
    },

    #[error("存储失败: {0}")]
    Persistence(RepositoryError),
}

impl EngineError {
    pub fn project_format(project_id: &str, field: &str, message: impl Into<String>) -> Self {
        EngineError::DataFormat {
            entity: "Project".to_string(),
            key: project_id.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// 数据格式错误保持分类，其余仓储错误一律视为持久化错误
impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DataFormat {
                entity,
                key,
                field,
                value,
                message,
            } => EngineError::DataFormat {
                entity,
                key,
                field,
                message: format!("'{}' {}", value, message),
            },
            other => EngineError::Persistence(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
