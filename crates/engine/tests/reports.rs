use engine::{DateWindow, EngineError, MAX_AMOUNT_MINOR, Money, Tz};
use uuid::Uuid;

mod common;

use common::{at, date, engine_with_db, register, spend};

#[tokio::test]
async fn dashboard_reference_scenario() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    let a = engine.create_category(user.id, "A", None).await.unwrap();
    let b = engine.create_category(user.id, "B", None).await.unwrap();

    spend(&engine, user.id, 1200, at(2024, 1, 5, 12), Some(a.id)).await;
    spend(&engine, user.id, 800, at(2024, 1, 5, 13), Some(b.id)).await;
    spend(&engine, user.id, 2000, at(2024, 2, 1, 9), Some(a.id)).await;

    let summary = engine
        .dashboard_summary(user.id, at(2024, 2, 10, 0))
        .await
        .unwrap();

    assert_eq!(summary.total_spent, Money::new(4000));
    assert_eq!(summary.month_to_date, Money::new(2000));
    let ranking: Vec<_> = summary
        .top_categories
        .iter()
        .map(|top| (top.name.as_str(), top.total.minor()))
        .collect();
    assert_eq!(ranking, vec![("A", 3200), ("B", 800)]);
}

#[tokio::test]
async fn dashboard_is_idempotent_without_writes() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    let food = engine.create_category(user.id, "Food", None).await.unwrap();
    spend(&engine, user.id, 1250, at(2024, 3, 2, 8), Some(food.id)).await;
    engine
        .create_budget(user.id, date(2024, 3, 1), Money::new(30_000), Some(food.id))
        .await
        .unwrap();

    let now = at(2024, 3, 15, 0);
    let first = engine.dashboard_summary(user.id, now).await.unwrap();
    let second = engine.dashboard_summary(user.id, now).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.budgets.len(), 1);
}

#[tokio::test]
async fn deleting_an_expense_reduces_total_by_its_amount() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    spend(&engine, user.id, 1000, at(2024, 4, 1, 10), None).await;
    let doomed = spend(&engine, user.id, 550, at(2024, 4, 2, 10), None).await;

    let now = at(2024, 4, 3, 0);
    let before = engine.dashboard_summary(user.id, now).await.unwrap();
    engine.delete_expense(user.id, doomed.id).await.unwrap();
    let after = engine.dashboard_summary(user.id, now).await.unwrap();

    assert_eq!(
        before.total_spent.minor() - after.total_spent.minor(),
        doomed.amount.minor()
    );
    assert!(after.total_spent >= after.month_to_date);
}

#[tokio::test]
async fn new_owner_has_zero_summary() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;

    let summary = engine
        .dashboard_summary(user.id, at(2024, 1, 1, 0))
        .await
        .unwrap();
    assert!(summary.total_spent.is_zero());
    assert!(summary.month_to_date.is_zero());
    assert!(summary.top_categories.is_empty());
    assert!(summary.budgets.is_empty());
}

#[tokio::test]
async fn unknown_owner_dashboard_is_not_found() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let err = engine
        .dashboard_summary(Uuid::new_v4(), at(2024, 1, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn unknown_owner_daily_totals_are_empty() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 7)).unwrap();
    let totals = engine.daily_totals(Uuid::new_v4(), window).await.unwrap();
    assert!(totals.is_empty());
}

#[tokio::test]
async fn single_day_window_sums_that_day() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    spend(&engine, user.id, 1000, at(2024, 5, 10, 8), None).await;
    spend(&engine, user.id, 550, at(2024, 5, 10, 19), None).await;
    spend(&engine, user.id, 999, at(2024, 5, 11, 0), None).await;

    let day = date(2024, 5, 10);
    let totals = engine
        .daily_totals(user.id, DateWindow::new(day, day).unwrap())
        .await
        .unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].day, day);
    assert_eq!(totals[0].total, Money::new(1550));
}

#[tokio::test]
async fn daily_totals_are_ascending_and_zero_filled() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    spend(&engine, user.id, 300, at(2024, 6, 3, 12), None).await;
    spend(&engine, user.id, 700, at(2024, 6, 1, 12), None).await;

    let window = DateWindow::new(date(2024, 6, 1), date(2024, 6, 4)).unwrap();
    let totals = engine.daily_totals(user.id, window).await.unwrap();
    let flat: Vec<_> = totals.iter().map(|t| (t.day, t.total.minor())).collect();
    assert_eq!(
        flat,
        vec![
            (date(2024, 6, 1), 700),
            (date(2024, 6, 2), 0),
            (date(2024, 6, 3), 300),
            (date(2024, 6, 4), 0),
        ]
    );
}

#[tokio::test]
async fn reporting_timezone_moves_day_boundaries() {
    let (engine, _db) = engine_with_db(chrono_tz::Europe::Rome).await;
    let user = register(&engine, "alice").await;
    // 23:30 UTC on June 1st is already June 2nd in Rome.
    spend(
        &engine,
        user.id,
        400,
        common::at(2024, 6, 1, 23) + chrono::Duration::minutes(30),
        None,
    )
    .await;

    let window = DateWindow::new(date(2024, 6, 1), date(2024, 6, 2)).unwrap();
    let totals = engine.daily_totals(user.id, window).await.unwrap();
    assert_eq!(totals[0].total, Money::ZERO);
    assert_eq!(totals[1].total, Money::new(400));
}

#[tokio::test]
async fn reports_never_mix_owners() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let food = engine.create_category(bob.id, "Food", None).await.unwrap();
    spend(&engine, alice.id, 100, at(2024, 7, 1, 10), None).await;
    spend(&engine, bob.id, 9000, at(2024, 7, 1, 10), Some(food.id)).await;

    let summary = engine
        .dashboard_summary(alice.id, at(2024, 7, 2, 0))
        .await
        .unwrap();
    assert_eq!(summary.total_spent, Money::new(100));
    assert!(summary.top_categories.is_empty());

    let day = date(2024, 7, 1);
    let totals = engine
        .daily_totals(alice.id, DateWindow::new(day, day).unwrap())
        .await
        .unwrap();
    assert_eq!(totals[0].total, Money::new(100));
}

#[tokio::test]
async fn reports_sum_amounts_at_the_cap() {
    let (engine, _db) = engine_with_db(Tz::UTC).await;
    let user = register(&engine, "alice").await;
    for _ in 0..3 {
        spend(&engine, user.id, MAX_AMOUNT_MINOR, at(2024, 8, 1, 12), None).await;
    }

    let summary = engine
        .dashboard_summary(user.id, at(2024, 8, 2, 0))
        .await
        .unwrap();
    assert_eq!(summary.total_spent, Money::new(3 * MAX_AMOUNT_MINOR));
    assert_eq!(summary.month_to_date, Money::new(3 * MAX_AMOUNT_MINOR));

    let day = date(2024, 8, 1);
    let totals = engine
        .daily_totals(user.id, DateWindow::new(day, day).unwrap())
        .await
        .unwrap();
    assert_eq!(totals[0].total, Money::new(3 * MAX_AMOUNT_MINOR));
}
