//! Request and response bodies of the HTTP API.
//!
//! Amounts always travel as integer minor units (`*_minor` fields, cents) so
//! clients never see binary floating-point money.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Signup {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub access_token: String,
        /// Always `"bearer"`.
        pub token_type: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<FixedOffset>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        /// Display hint (e.g. `#4f46e5`); server default when absent.
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub name: String,
        pub color: String,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        /// Must be > 0.
        pub amount_minor: i64,
        /// RFC3339 timestamp. If absent, server uses now().
        pub spent_at: Option<DateTime<FixedOffset>>,
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub spent_at: Option<DateTime<FixedOffset>>,
        pub category_id: Option<Uuid>,
        /// Move the expense to uncategorized. Conflicts with `category_id`.
        #[serde(default)]
        pub clear_category: bool,
    }

    /// Query string of `GET /expenses`. Dates are `YYYY-MM-DD`, inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseQuery {
        pub category_id: Option<Uuid>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        /// RFC3339 timestamp (UTC).
        pub spent_at: DateTime<FixedOffset>,
        pub category_id: Option<Uuid>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        /// Any day of the target month; stored as the first day.
        pub month: NaiveDate,
        pub amount_minor: i64,
        /// `None` for an overall budget.
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub month: NaiveDate,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
    }
}

pub mod report {
    use super::*;

    /// Query string of `GET /expenses/daily`. Dates are `YYYY-MM-DD`,
    /// inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DailyTotal {
        pub day: NaiveDate,
        pub total_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TopCategory {
        pub category_id: Uuid,
        pub name: String,
        pub color: String,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardSummary {
        pub total_spent_minor: i64,
        pub month_to_date_minor: i64,
        pub budgets: Vec<super::budget::BudgetView>,
        pub top_categories: Vec<TopCategory>,
    }
}
