// ==========================================
// 项目评审排期系统 - CSV 表格存储
// ==========================================
// 格式: 表头 + 数据行，每个实体集一个文件
// 写入: 先写临时文件再 rename，保证整集替换是原子的
// 备份: 每个存储实例首次覆盖前保留 <file>.<YYYYmmdd_HHMMSS>.bak
//       同名已存在时追加序号 <file>.<stamp>.<N>.bak
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record::{RawRecord, Record};
use crate::repository::record_store::{ensure_new_key, replace_by_key, RecordStore};
use chrono::Local;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::path::{Path, PathBuf};

// ==========================================
// CsvRecordStore
// ==========================================
pub struct CsvRecordStore<R: Record> {
    path: PathBuf,
    backup_on_write: bool,
    backed_up: AtomicBool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> CsvRecordStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_on_write: false,
            backed_up: AtomicBool::new(false),
            _record: PhantomData,
        }
    }

    /// 覆盖写入前是否备份原文件
    pub fn with_backup(mut self, enabled: bool) -> Self {
        self.backup_on_write = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时按表头创建空表
    ///
    /// # 返回
    /// - true: 新建了文件
    /// - false: 文件已存在
    pub fn ensure_exists(&self) -> RepositoryResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.write_file(&[])?;
        tracing::info!(path = %self.path.display(), entity = R::ENTITY, "已创建空表");
        Ok(true)
    }

    fn write_file(&self, records: &[R]) -> RepositoryResult<()> {
        let tmp_path = self.tmp_path();
        {
            let mut writer = WriterBuilder::new().from_path(&tmp_path)?;
            writer.write_record(R::HEADERS)?;
            for record in records {
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn backup_path(&self, timestamp: &str) -> PathBuf {
        let base = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let mut counter = 0u32;
        loop {
            let mut name = base.clone();
            if counter == 0 {
                name.push(format!(".{}.bak", timestamp));
            } else {
                name.push(format!(".{}.{}.bak", timestamp, counter));
            }
            let candidate = self.path.with_file_name(name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// 备份原文件（同一实例只备份一次，保留运行前的内容）
    ///
    /// # 返回
    /// - Some(path): 本次生成的备份文件
    /// - None: 本实例已备份过
    fn backup(&self) -> RepositoryResult<Option<PathBuf>> {
        if self.backed_up.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_path = self.backup_path(&timestamp);
        fs::copy(&self.path, &backup_path)?;
        tracing::debug!(
            from = %self.path.display(),
            to = %backup_path.display(),
            "已备份表格文件"
        );
        self.backed_up.store(true, Ordering::SeqCst);
        Ok(Some(backup_path))
    }
}

impl<R: Record> RecordStore<R> for CsvRecordStore<R> {
    fn read_all(&self) -> RepositoryResult<Vec<R>> {
        self.read_raw()?
            .iter()
            .map(|(_, raw)| R::from_raw(raw))
            .collect()
    }

    fn write_all(&self, records: &[R]) -> RepositoryResult<()> {
        if self.backup_on_write && self.path.exists() {
            self.backup()?;
        }
        self.write_file(records)?;
        tracing::debug!(
            path = %self.path.display(),
            entity = R::ENTITY,
            count = records.len(),
            "实体集已写回"
        );
        Ok(())
    }

    fn append(&self, record: &R) -> RepositoryResult<()> {
        let mut records = self.read_all()?;
        ensure_new_key(&records, record)?;
        records.push(record.clone());
        self.write_all(&records)
    }

    fn update_by_key(&self, key: &str, record: &R) -> RepositoryResult<()> {
        let mut records = self.read_all()?;
        replace_by_key(&mut records, key, record)?;
        self.write_all(&records)
    }

    fn read_raw(&self) -> RepositoryResult<Vec<(usize, RawRecord)>> {
        if !self.path.exists() {
            self.ensure_exists()?;
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let missing: Vec<String> = R::HEADERS
            .iter()
            .filter(|h| !headers.iter().any(|c| c == *h))
            .map(|h| h.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RepositoryError::SchemaMismatch {
                path: self.path.display().to_string(),
                missing,
            });
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row_map = RawRecord::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push((idx + 2, row_map));
        }

        Ok(rows)
    }
}
