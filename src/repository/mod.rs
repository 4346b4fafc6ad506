// ==========================================
// 项目评审排期系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 按实体集提供 read_all / write_all / append / update_by_key,
//       并在存储边界完成字符串行 <-> 强类型实体的转换
// ==========================================

pub mod csv_store;
pub mod error;
pub mod memory_store;
pub mod record;
pub mod record_store;
pub mod sqlite_store;

// 重导出核心仓储
pub use csv_store::CsvRecordStore;
pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::InMemoryRecordStore;
pub use record::{RawRecord, Record};
pub use record_store::RecordStore;
pub use sqlite_store::SqliteRecordStore;
