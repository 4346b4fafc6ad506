// ==========================================
// 项目评审排期系统 - SQLite 记录存储
// ==========================================
// 表结构: 每个实体集一张表，列名与表格文件表头一致（TEXT）
// 主键: 第一列
// 顺序: 按 rowid 读取，保持写入顺序（分配引擎的平局规则依赖它）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record::{RawRecord, Record};
use crate::repository::record_store::RecordStore;
use rusqlite::{params_from_iter, Connection};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteRecordStore<R: Record> {
    conn: Arc<Mutex<Connection>>,
    table: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> SqliteRecordStore<R> {
    /// 从已有连接创建存储，并确保表存在
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let store = Self {
            conn,
            table: format!("{}s", R::ENTITY.to_lowercase()),
            _record: PhantomData,
        };
        store.ensure_table()?;
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let columns: Vec<String> = R::HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    format!("\"{}\" TEXT PRIMARY KEY", h)
                } else {
                    format!("\"{}\" TEXT NOT NULL DEFAULT ''", h)
                }
            })
            .collect();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table,
            columns.join(", ")
        );
        self.get_conn()?.execute(&sql, [])?;
        Ok(())
    }

    fn column_list() -> String {
        R::HEADERS
            .iter()
            .map(|h| format!("\"{}\"", h))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_sql(&self) -> String {
        let placeholders: Vec<String> = (1..=R::HEADERS.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            Self::column_list(),
            placeholders.join(", ")
        )
    }

    fn duplicate_key(record: &R) -> RepositoryError {
        RepositoryError::DuplicateKey {
            entity: R::ENTITY.to_string(),
            id: record.key().to_string(),
        }
    }
}

impl<R: Record> RecordStore<R> for SqliteRecordStore<R> {
    fn read_all(&self) -> RepositoryResult<Vec<R>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            Self::column_list(),
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let width = R::HEADERS.len();
        let rows = stmt.query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, String>(i))
                .collect::<rusqlite::Result<Vec<String>>>()
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(R::from_row(&row?)?);
        }
        Ok(records)
    }

    fn read_raw(&self) -> RepositoryResult<Vec<(usize, RawRecord)>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            Self::column_list(),
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            R::HEADERS
                .iter()
                .enumerate()
                .map(|(i, h)| Ok((h.to_string(), row.get::<_, String>(i)?)))
                .collect::<rusqlite::Result<RawRecord>>()
        })?;

        let mut raw_rows = Vec::new();
        for (idx, row) in rows.enumerate() {
            raw_rows.push((idx + 2, row?));
        }
        Ok(raw_rows)
    }

    fn write_all(&self, records: &[R]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(&format!("DELETE FROM {}", self.table), [])?;
        {
            let mut stmt = tx.prepare(&self.insert_sql())?;
            for record in records {
                stmt.execute(params_from_iter(record.to_row()))
                    .map_err(|e| match RepositoryError::from(e) {
                        RepositoryError::DuplicateKey { .. } => Self::duplicate_key(record),
                        other => other,
                    })?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn append(&self, record: &R) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(&self.insert_sql(), params_from_iter(record.to_row()))
            .map_err(|e| match RepositoryError::from(e) {
                RepositoryError::DuplicateKey { .. } => Self::duplicate_key(record),
                other => other,
            })?;
        Ok(())
    }

    fn update_by_key(&self, key: &str, record: &R) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let assignments: Vec<String> = R::HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| format!("\"{}\" = ?{}", h, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE \"{}\" = ?{}",
            self.table,
            assignments.join(", "),
            R::HEADERS[0],
            R::HEADERS.len() + 1
        );

        let mut values = record.to_row();
        values.push(key.to_string());
        let affected = conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: R::ENTITY.to_string(),
                id: key.to_string(),
            });
        }
        Ok(())
    }
}
