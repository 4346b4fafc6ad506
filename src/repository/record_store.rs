// ==========================================
// 项目评审排期系统 - 记录存储接口
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 单写者假设，不做并发控制
// ==========================================

use crate::repository::error::RepositoryResult;
use crate::repository::record::{RawRecord, Record};

/// 按实体集划分的键控记录存储
///
/// 引擎只依赖这四个操作，不关心底层是表格文件还是数据库
pub trait RecordStore<R: Record> {
    /// 读取整个实体集
    fn read_all(&self) -> RepositoryResult<Vec<R>>;

    /// 原子替换整个实体集（要么全部写入，要么不写）
    fn write_all(&self, records: &[R]) -> RepositoryResult<()>;

    /// 追加一条记录；主键已存在时返回 DuplicateKey
    fn append(&self, record: &R) -> RepositoryResult<()>;

    /// 按主键替换一条记录；主键不存在时返回 NotFound
    fn update_by_key(&self, key: &str, record: &R) -> RepositoryResult<()>;

    /// 读取未经类型转换的原始行（行号从 2 开始，表头为第 1 行），供字段级校验
    ///
    /// 默认实现由强类型记录回写成文本；能直接拿到原始文本的存储应覆盖它
    fn read_raw(&self) -> RepositoryResult<Vec<(usize, RawRecord)>> {
        Ok(self
            .read_all()?
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let raw = R::HEADERS
                    .iter()
                    .zip(record.to_row())
                    .map(|(h, v)| (h.to_string(), v))
                    .collect();
                (idx + 2, raw)
            })
            .collect())
    }
}

/// 在内存快照中按主键替换，供各存储实现复用
pub(crate) fn replace_by_key<R: Record>(
    records: &mut [R],
    key: &str,
    record: &R,
) -> RepositoryResult<()> {
    match records.iter_mut().find(|r| r.key() == key) {
        Some(slot) => {
            *slot = record.clone();
            Ok(())
        }
        None => Err(crate::repository::error::RepositoryError::NotFound {
            entity: R::ENTITY.to_string(),
            id: key.to_string(),
        }),
    }
}

/// 追加前的主键唯一性检查
pub(crate) fn ensure_new_key<R: Record>(records: &[R], record: &R) -> RepositoryResult<()> {
    if records.iter().any(|r| r.key() == record.key()) {
        return Err(crate::repository::error::RepositoryError::DuplicateKey {
            entity: R::ENTITY.to_string(),
            id: record.key().to_string(),
        });
    }
    Ok(())
}
