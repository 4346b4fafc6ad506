// ==========================================
// SchedulerApi 端到端测试
// ==========================================
// 测试范围:
// 1. CSV 后端: 完整周期、重复执行、格式错误不落盘
// 2. SQLite 后端: 完整周期
// 3. 数据校验
// 4. 报表与通知
// ==========================================

mod helpers;

use helpers::store_fixture::{StoreFixture, PROJECTS_HEADER, REVIEWS_HEADER, USERS_HEADER};
use helpers::test_data_builder::{date, ProjectBuilder, UserBuilder};
use review_scheduler::api::ApiError;
use review_scheduler::db::open_sqlite_connection;
use review_scheduler::domain::{Project, ProjectStatus, User};
use review_scheduler::engine::report::write_overdue_csv;
use review_scheduler::engine::{NotificationMessage, NotificationSink};
use review_scheduler::repository::{RecordStore, SqliteRecordStore};
use std::cell::RefCell;
use std::error::Error;
use std::sync::{Arc, Mutex};

fn seed_csv(fixture: &StoreFixture) {
    fixture.write_table(
        "Projects.csv",
        PROJECTS_HEADER,
        &[
            "P1,Alpha,2020-01-01,2024-01-01,1,IT,,",
            "P2,Beta,2021-03-01,,0.5,HR,,",
            "P3,Gamma,2024-01-01,2025-01-01,2,Finance,,",
        ],
    );
    fixture.write_table(
        "Users.csv",
        USERS_HEADER,
        &[
            "U1,Ann,ann@example.com,IT,0",
            "U2,Bob,bob@example.com,HR,1",
            "U3,Cy,cy@example.com,Finance,2.0",
        ],
    );
    fixture.write_table("Reviews.csv", REVIEWS_HEADER, &[]);
}

// ==========================================
// CSV 后端
// ==========================================

#[test]
fn test_csv_run_cycle_end_to_end() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    let api = fixture.open();

    let cycle = api.run_cycle(Some(date(2025, 6, 1))).unwrap();
    assert_eq!(cycle.status.overdue, 2);
    assert_eq!(cycle.status.up_to_date, 1);
    assert_eq!(cycle.assignment.total_needing_review, 2);
    assert_eq!(cycle.assignment.total_assigned, 2);

    let pairs: Vec<(&str, &str)> = cycle
        .assignment
        .assignments
        .iter()
        .map(|r| (r.project_id.as_str(), r.reviewer_id.as_str()))
        .collect();
    // U3 的 "2.0" 不是整数，按 0 处理
    assert_eq!(pairs, vec![("P1", "U3"), ("P2", "U1")]);

    let projects = fixture.read_table("Projects.csv");
    assert!(projects.contains("P1,Alpha,2020-01-01,2024-01-01"));
    assert!(projects.contains("Overdue,2025-01-01"));
    assert!(projects.contains("Overdue,2021-09-01"));

    let users = fixture.read_table("Users.csv");
    assert!(users.contains("U1,Ann,ann@example.com,IT,1"));
    assert!(users.contains("U2,Bob,bob@example.com,HR,1"));
    assert!(users.contains("U3,Cy,cy@example.com,Finance,1"));

    let reviews = fixture.read_table("Reviews.csv");
    assert!(reviews.contains("R20250601-001,P1,U3,2025-07-01,Scheduled,"));
    assert!(reviews.contains("R20250601-002,P2,U1,2025-07-01,Scheduled,"));
}

#[test]
fn test_csv_second_cycle_assigns_nothing_new() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    let api = fixture.open();

    api.run_cycle(Some(date(2025, 6, 1))).unwrap();
    let projects_after_first = fixture.read_table("Projects.csv");

    let second = api.run_cycle(Some(date(2025, 6, 1))).unwrap();
    assert_eq!(second.assignment.already_assigned, 2);
    assert_eq!(second.assignment.total_assigned, 0);
    assert_eq!(fixture.read_table("Projects.csv"), projects_after_first);
    assert_eq!(fixture.read_table("Reviews.csv").lines().count(), 3);
}

#[test]
fn test_csv_missing_tables_are_created() {
    let fixture = StoreFixture::csv();
    let api = fixture.open();

    let summary = api.calculate_reviews(Some(date(2025, 6, 1))).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(fixture.read_table("Users.csv").trim(), USERS_HEADER);
    assert_eq!(fixture.read_table("Reviews.csv").trim(), REVIEWS_HEADER);
}

#[test]
fn test_csv_malformed_date_aborts_without_writing() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    fixture.write_table(
        "Projects.csv",
        PROJECTS_HEADER,
        &[
            "P1,Alpha,2020-01-01,2024-01-01,1,IT,,",
            "P2,Beta,not-a-date,,0.5,HR,,",
        ],
    );
    let before = fixture.read_table("Projects.csv");
    let api = fixture.open();

    let err = api.calculate_reviews(Some(date(2025, 6, 1))).unwrap_err();
    assert!(matches!(err, ApiError::DataFormat(_)), "got {err:?}");
    assert_eq!(fixture.read_table("Projects.csv"), before);
}

#[test]
fn test_csv_validate_reports_field_problems() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    fixture.write_table(
        "Projects.csv",
        PROJECTS_HEADER,
        &[
            "P1,Alpha,2020-13-01,2024-01-01,1,IT,,",
            "P2,,2021-03-01,,abc,HR,,",
        ],
    );
    let api = fixture.open();

    let report = api.validate().unwrap();
    assert!(!report.is_valid());

    let fields: Vec<(usize, &str)> = report
        .field_findings
        .iter()
        .map(|f| (f.row, f.field.as_str()))
        .collect();
    assert!(fields.contains(&(2, "Start_Date")));
    assert!(fields.contains(&(3, "Project_Name")));
    assert!(fields.contains(&(3, "Review_Frequency_Years")));
    // 存在无法解码的记录时不做引用完整性检查
    assert!(report.integrity_findings.is_empty());
}

#[test]
fn test_csv_validate_clean_data_after_cycle() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    let api = fixture.open();
    api.run_cycle(Some(date(2025, 6, 1))).unwrap();

    let report = api.validate().unwrap();
    assert!(report.field_findings.is_empty());
    assert!(report.integrity_findings.is_empty());
    // U2 初始负载 1 无对应评审
    let users: Vec<&str> = report
        .load_findings
        .iter()
        .map(|f| f.user_id.as_str())
        .collect();
    assert_eq!(users, vec!["U2"]);
}

// ==========================================
// 报表与通知
// ==========================================

#[test]
fn test_reports_after_cycle() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    let api = fixture.open();
    api.run_cycle(Some(date(2025, 6, 1))).unwrap();

    let schedule = api.monthly_schedule(2025, 7).unwrap();
    assert_eq!(schedule.len(), 2);
    assert!(api.monthly_schedule(2025, 8).unwrap().is_empty());

    let workload = api.workload_report().unwrap();
    let counts: Vec<(&str, usize)> = workload
        .iter()
        .map(|w| (w.user_id.as_str(), w.active_count))
        .collect();
    assert_eq!(counts, vec![("U1", 1), ("U3", 1), ("U2", 0)]);

    let alerts = api.overdue_alerts(Some(date(2025, 6, 1))).unwrap();
    let order: Vec<(&str, &str)> = alerts
        .iter()
        .map(|a| (a.project_id.as_str(), a.reviewer_name.as_str()))
        .collect();
    assert_eq!(order, vec![("P2", "Ann"), ("P1", "Cy")]);
    assert_eq!(alerts[1].days_overdue, 151);

    let out = fixture.path("overdue.csv");
    write_overdue_csv(&out, &alerts).unwrap();
    let exported = std::fs::read_to_string(&out).unwrap();
    assert!(exported.starts_with("Project_ID,Project_Name,Department,Next_Review_Date,Days_Overdue"));
    assert!(exported.contains("P1,Alpha,IT,2025-01-01,151,Cy"));
}

#[derive(Default)]
struct RecordingSink {
    sent: RefCell<Vec<NotificationMessage>>,
}

impl NotificationSink for RecordingSink {
    fn send(&self, message: &NotificationMessage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

#[test]
fn test_notifications_for_overdue_projects() {
    let fixture = StoreFixture::csv();
    seed_csv(&fixture);
    let api = fixture.open();
    api.run_cycle(Some(date(2025, 6, 1))).unwrap();

    let sink = RecordingSink::default();
    let summary = api
        .send_notifications(Some(ProjectStatus::Overdue), &sink)
        .unwrap();
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.failed, 0);

    let sent = sink.sent.borrow();
    assert!(sent.iter().all(|m| m.subject.starts_with("[URGENT] ")));
    assert!(sent.iter().any(|m| m.to == "cy@example.com"));

    let none = api
        .send_notifications(Some(ProjectStatus::UpToDate), &sink)
        .unwrap();
    assert_eq!(none.total, 0);
}

// ==========================================
// SQLite 后端
// ==========================================

#[test]
fn test_sqlite_run_cycle_end_to_end() {
    let fixture = StoreFixture::sqlite();
    {
        let db_path = fixture.config.sqlite_path();
        let conn = open_sqlite_connection(&db_path.to_string_lossy()).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let projects = SqliteRecordStore::<Project>::from_connection(conn.clone()).unwrap();
        let users = SqliteRecordStore::<User>::from_connection(conn).unwrap();
        projects
            .write_all(&[
                ProjectBuilder::new("P1")
                    .department("IT")
                    .last_review(date(2024, 1, 1))
                    .build(),
                ProjectBuilder::new("P2")
                    .department("IT")
                    .last_review(date(2025, 5, 1))
                    .build(),
            ])
            .unwrap();
        users
            .write_all(&[
                UserBuilder::new("U1").department("IT").build(),
                UserBuilder::new("U2").department("Finance").load(3).build(),
            ])
            .unwrap();
    }

    let api = fixture.open();
    let cycle = api.run_cycle(Some(date(2025, 6, 1))).unwrap();
    assert_eq!(cycle.status.overdue, 1);
    assert_eq!(cycle.status.up_to_date, 1);
    assert_eq!(cycle.assignment.total_assigned, 1);
    assert_eq!(cycle.assignment.assignments[0].reviewer_id, "U2");

    let again = api.run_cycle(Some(date(2025, 6, 1))).unwrap();
    assert_eq!(again.assignment.total_assigned, 0);
    assert_eq!(again.assignment.already_assigned, 1);

    let report = api.validate().unwrap();
    assert!(report.field_findings.is_empty());
    assert!(report.integrity_findings.is_empty());
}
