//! Expense tracking engine.
//!
//! The crate owns the record store (users, categories, expenses, budgets)
//! and the spending reports computed from it. Every operation is scoped by
//! an explicit owner id; the [`Engine`] itself holds no per-user state and
//! can be shared freely across requests.

pub use budgets::Budget;
pub use categories::Category;
pub use error::EngineError;
pub use expenses::{Expense, MAX_AMOUNT_MINOR, MAX_DESCRIPTION_LEN};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, ExpenseFilter, ExpenseNew, ExpenseUpdate};
pub use report::{
    DailyTotal, DashboardSummary, DateWindow, MAX_WINDOW_DAYS, TOP_CATEGORIES_LIMIT, TopCategory,
};
pub use users::User;
pub use util::MIN_PASSWORD_LEN;

pub use chrono_tz::Tz;

mod budgets;
mod categories;
mod error;
mod expenses;
mod money;
mod ops;
pub mod report;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
