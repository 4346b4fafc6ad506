// ==========================================
// 存储测试环境
// ==========================================
// 职责: 在临时目录中准备表格文件 / SQLite 数据库，并打开 SchedulerApi
// ==========================================

use review_scheduler::api::SchedulerApi;
use review_scheduler::config::{SchedulerConfig, StoreBackend};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PROJECTS_HEADER: &str =
    "Project_ID,Project_Name,Start_Date,Last_Review_Date,Review_Frequency_Years,Department,Status,Next_Review_Date";
pub const USERS_HEADER: &str = "User_ID,Name,Email,Department,Current_Load";
pub const REVIEWS_HEADER: &str =
    "Review_ID,Project_ID,Reviewer_ID,Scheduled_Date,Status,Completion_Date";

/// 临时数据目录（需要保持存活）
pub struct StoreFixture {
    pub dir: TempDir,
    pub config: SchedulerConfig,
}

impl StoreFixture {
    pub fn new(backend: StoreBackend) -> Self {
        let dir = TempDir::new().unwrap();
        let config = SchedulerConfig {
            data_dir: dir.path().to_path_buf(),
            backend,
            backup_on_write: false,
            ..SchedulerConfig::default()
        };
        Self { dir, config }
    }

    pub fn csv() -> Self {
        Self::new(StoreBackend::Csv)
    }

    pub fn sqlite() -> Self {
        Self::new(StoreBackend::Sqlite)
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    /// 写入表格文件（header + 若干数据行）
    pub fn write_table(&self, file: &str, header: &str, rows: &[&str]) {
        let mut content = String::from(header);
        content.push('\n');
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(self.path(file), content).unwrap();
    }

    pub fn read_table(&self, file: &str) -> String {
        fs::read_to_string(self.path(file)).unwrap()
    }

    pub fn open(&self) -> SchedulerApi {
        SchedulerApi::open(self.config.clone()).unwrap()
    }
}
