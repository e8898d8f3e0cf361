#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, ExpenseNew, Money, Tz, User};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn engine_with_db(timezone: Tz) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .timezone(timezone)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, name: &str) -> User {
    engine
        .register_user(name, &format!("{name}@example.com"), "password")
        .await
        .unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn spend(
    engine: &Engine,
    owner: Uuid,
    minor: i64,
    spent_at: DateTime<Utc>,
    category_id: Option<Uuid>,
) -> engine::Expense {
    engine
        .create_expense(
            owner,
            ExpenseNew {
                description: "expense".to_string(),
                amount: Money::new(minor),
                spent_at,
                category_id,
            },
        )
        .await
        .unwrap()
}
