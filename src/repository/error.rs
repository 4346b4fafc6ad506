// ==========================================
// 项目评审排期系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据格式错误 =====
    /// 记录字段无法解析（日期/数值格式错误、必填字段缺失）
    #[error("数据格式错误: {entity} {key} 字段 {field} 的值 '{value}' 无效: {message}")]
    DataFormat {
        entity: String,
        key: String,
        field: String,
        value: String,
        message: String,
    },

    #[error("表头不匹配: {path} 缺少列 {missing:?}")]
    SchemaMismatch { path: String, missing: Vec<String> },

    // ===== 记录级错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("主键重复: {entity} with id={id}")]
    DuplicateKey { entity: String, id: String },

    // ===== 存储错误 =====
    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("表格文件解析失败: {0}")]
    Csv(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("存储锁获取失败: {0}")]
    LockError(String),
}

impl RepositoryError {
    /// 构造数据格式错误
    pub fn data_format(
        entity: &str,
        key: &str,
        field: &str,
        value: &str,
        message: impl Into<String>,
    ) -> Self {
        RepositoryError::DataFormat {
            entity: entity.to_string(),
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// 是否为数据格式类错误（其余均视为持久化错误）
    pub fn is_data_format(&self) -> bool {
        matches!(self, RepositoryError::DataFormat { .. })
    }
}

impl From<csv::Error> for RepositoryError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => RepositoryError::Io(io),
                other => RepositoryError::Csv(format!("{:?}", other)),
            }
        } else {
            RepositoryError::Csv(err.to_string())
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::DuplicateKey {
                        entity: "Unknown".to_string(),
                        id: msg,
                    }
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
