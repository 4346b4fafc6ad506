// ==========================================
// 项目评审排期系统 - 内存记录存储
// ==========================================
// 用途: 嵌入调用方 / 单元测试
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record::Record;
use crate::repository::record_store::{ensure_new_key, replace_by_key, RecordStore};
use std::sync::{Mutex, MutexGuard};

pub struct InMemoryRecordStore<R: Record> {
    records: Mutex<Vec<R>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Vec<R>>> {
        self.records
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 当前快照（测试断言用）
    pub fn snapshot(&self) -> Vec<R> {
        self.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    fn read_all(&self) -> RepositoryResult<Vec<R>> {
        Ok(self.lock()?.clone())
    }

    fn write_all(&self, records: &[R]) -> RepositoryResult<()> {
        *self.lock()? = records.to_vec();
        Ok(())
    }

    fn append(&self, record: &R) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        ensure_new_key(&guard, record)?;
        guard.push(record.clone());
        Ok(())
    }

    fn update_by_key(&self, key: &str, record: &R) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        replace_by_key(&mut guard, key, record)
    }
}
