// ==========================================
// DueDateEngine 集成测试
// ==========================================
// 测试范围:
// 1. 下次评审日计算（小数周期截断、月末处理、开始日兜底）
// 2. 状态边界（0 / -1 / 30 / 31 天）
// 3. 全量重算写回与幂等性
// 4. 格式错误时不写入任何状态
// ==========================================

mod helpers;

use helpers::test_data_builder::{date, ProjectBuilder};
use review_scheduler::api::calculate_all_reviews;
use review_scheduler::domain::{Project, ProjectStatus};
use review_scheduler::engine::{DueDateEngine, EngineError};
use review_scheduler::repository::{InMemoryRecordStore, RecordStore};

#[test]
fn test_half_year_frequency_due_soon() {
    let engine = DueDateEngine::new();
    let project = ProjectBuilder::new("P1")
        .last_review(date(2024, 1, 15))
        .frequency(0.5)
        .build();

    let due = engine.compute_due_status(&project, date(2024, 7, 1)).unwrap();
    assert_eq!(due.next_review_date, date(2024, 7, 15));
    assert_eq!(due.days_until, 14);
    assert_eq!(due.status, ProjectStatus::DueSoon);
}

#[test]
fn test_status_boundaries_around_window() {
    let engine = DueDateEngine::new();
    let project = ProjectBuilder::new("P1")
        .last_review(date(2024, 3, 1))
        .frequency(1.0)
        .build();
    // 下次评审日 2025-03-01
    let cases = [
        (date(2025, 3, 1), ProjectStatus::DueSoon),  // 0 天
        (date(2025, 3, 2), ProjectStatus::Overdue),  // -1 天
        (date(2025, 1, 30), ProjectStatus::DueSoon), // 30 天
        (date(2025, 1, 29), ProjectStatus::UpToDate), // 31 天
    ];

    for (reference, expected) in cases {
        let due = engine.compute_due_status(&project, reference).unwrap();
        assert_eq!(due.status, expected, "reference={}", reference);
    }
}

#[test]
fn test_never_reviewed_project_anchors_on_start_date() {
    let engine = DueDateEngine::new();
    let project = ProjectBuilder::new("P1")
        .start_date(date(2023, 5, 10))
        .frequency(2.0)
        .build();

    let due = engine.compute_due_status(&project, date(2024, 1, 1)).unwrap();
    assert_eq!(due.next_review_date, date(2025, 5, 10));
    assert_eq!(due.status, ProjectStatus::UpToDate);
}

#[test]
fn test_month_end_anchor_clamps_to_last_day() {
    let engine = DueDateEngine::new();
    let project = ProjectBuilder::new("P1")
        .last_review(date(2023, 8, 31))
        .frequency(0.5)
        .build();

    let due = engine.compute_due_status(&project, date(2024, 1, 1)).unwrap();
    assert_eq!(due.next_review_date, date(2024, 2, 29));
}

#[test]
fn test_calculate_all_reviews_writes_back_and_is_idempotent() {
    let store = InMemoryRecordStore::with_records(vec![
        ProjectBuilder::new("P1")
            .last_review(date(2024, 1, 1))
            .frequency(1.0)
            .build(),
        ProjectBuilder::new("P2")
            .last_review(date(2025, 5, 20))
            .frequency(0.1)
            .build(),
        ProjectBuilder::new("P3")
            .last_review(date(2025, 1, 1))
            .frequency(3.0)
            .build(),
    ]);
    let reference = date(2025, 6, 1);

    let first = calculate_all_reviews(&store, Some(reference)).unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.overdue, 1);
    assert_eq!(first.due_soon, 1);
    assert_eq!(first.up_to_date, 1);
    let after_first: Vec<Project> = store.snapshot();

    let second = calculate_all_reviews(&store, Some(reference)).unwrap();
    assert_eq!(first, second);
    assert_eq!(after_first, store.snapshot());

    let p2 = &after_first[1];
    // 0.1 年 -> 1 个月
    assert_eq!(p2.next_review_date, Some(date(2025, 6, 20)));
    assert_eq!(p2.status, Some(ProjectStatus::DueSoon));
}

#[test]
fn test_bad_frequency_aborts_without_writing() {
    let original = vec![
        ProjectBuilder::new("P1")
            .last_review(date(2024, 1, 1))
            .frequency(1.0)
            .build(),
        ProjectBuilder::new("P2").frequency(-1.0).build(),
    ];
    let store = InMemoryRecordStore::with_records(original.clone());

    let err = DueDateEngine::new()
        .calculate_all_reviews(&store, date(2025, 6, 1))
        .unwrap_err();
    match err {
        EngineError::DataFormat { key, field, .. } => {
            assert_eq!(key, "P2");
            assert_eq!(field, "Review_Frequency_Years");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.read_all().unwrap(), original);
}

#[test]
fn test_frequency_truncation_table() {
    let cases = [
        (0.5, 6),
        (1.0, 12),
        (1.5, 18),
        (0.99, 11),
        (0.25, 3),
        (2.04, 24),
    ];
    for (years, months) in cases {
        assert_eq!(
            DueDateEngine::frequency_to_months(years),
            Some(months),
            "years={}",
            years
        );
    }
}
