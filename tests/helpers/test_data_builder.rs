// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use review_scheduler::domain::{Project, ProjectStatus, Review, ReviewStatus, User};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// Project 构建器
// ==========================================

pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(project_id: &str) -> Self {
        Self {
            project: Project {
                project_id: project_id.to_string(),
                project_name: format!("Project {}", project_id),
                start_date: date(2020, 1, 1),
                last_review_date: None,
                review_frequency_years: 1.0,
                department: "IT".to_string(),
                status: None,
                next_review_date: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.project.project_name = name.to_string();
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.project.department = department.to_string();
        self
    }

    pub fn start_date(mut self, start: NaiveDate) -> Self {
        self.project.start_date = start;
        self
    }

    pub fn last_review(mut self, last: NaiveDate) -> Self {
        self.project.last_review_date = Some(last);
        self
    }

    pub fn frequency(mut self, years: f64) -> Self {
        self.project.review_frequency_years = years;
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.project.status = Some(status);
        self
    }

    pub fn next_review(mut self, next: NaiveDate) -> Self {
        self.project.next_review_date = Some(next);
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

// ==========================================
// User 构建器
// ==========================================

pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn new(user_id: &str) -> Self {
        Self {
            user: User {
                user_id: user_id.to_string(),
                name: format!("Reviewer {}", user_id),
                email: format!("{}@example.com", user_id.to_lowercase()),
                department: "IT".to_string(),
                current_load: 0,
            },
        }
    }

    pub fn department(mut self, department: &str) -> Self {
        self.user.department = department.to_string();
        self
    }

    pub fn load(mut self, load: u32) -> Self {
        self.user.current_load = load;
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.user.email = email.to_string();
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// 快速构造评审记录
pub fn review(
    review_id: &str,
    project_id: &str,
    reviewer_id: &str,
    scheduled: NaiveDate,
    status: ReviewStatus,
) -> Review {
    Review {
        review_id: review_id.to_string(),
        project_id: project_id.to_string(),
        reviewer_id: reviewer_id.to_string(),
        scheduled_date: scheduled,
        status,
        completion_date: None,
    }
}
