// ==========================================
// 项目评审排期系统 - API层错误类型
// ==========================================
// 职责: 把仓储/引擎/配置错误收敛为调用方可读的错误
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 记录字段格式错误（本次运行已中止，未写入任何状态）
    #[error("数据格式错误: {0}")]
    DataFormat(String),

    #[error("存储错误: {0}")]
    Persistence(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        if err.is_data_format() {
            ApiError::DataFormat(err.to_string())
        } else {
            ApiError::Persistence(err.to_string())
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DataFormat { .. } => ApiError::DataFormat(err.to_string()),
            EngineError::Persistence(inner) => ApiError::Persistence(inner.to_string()),
        }
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
