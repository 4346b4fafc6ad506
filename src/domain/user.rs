// ==========================================
// 项目评审排期系统 - 评审人实体
// ==========================================

use serde::{Deserialize, Serialize};

/// 评审人
///
/// current_load 由分配引擎增量维护，等于引用该评审人的活跃评审数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub current_load: u32,
}

impl User {
    /// 是否与给定部门不同（跨部门评审判定）
    pub fn is_outside(&self, department: &str) -> bool {
        self.department != department
    }
}
