//! Spending aggregation.
//!
//! Everything in this module is a pure computation over an already loaded
//! snapshot of one owner's rows. Timestamps are bucketed into calendar days
//! and months using a fixed reporting timezone, so the same snapshot always
//! produces the same report.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{Budget, Category, EngineError, Expense, Money, ResultEngine};

/// Number of categories kept in [`DashboardSummary::top_categories`].
pub const TOP_CATEGORIES_LIMIT: usize = 5;

/// Longest window accepted by [`DateWindow::new`], in days.
pub const MAX_WINDOW_DAYS: u64 = 366;

/// Inclusive range of calendar days `[from, to]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        if from > to {
            return Err(EngineError::InvalidInput(format!(
                "invalid window: {from} is after {to}"
            )));
        }
        let window = Self { from, to };
        if window.len() > MAX_WINDOW_DAYS {
            return Err(EngineError::InvalidInput(format!(
                "invalid window: at most {MAX_WINDOW_DAYS} days allowed"
            )));
        }
        Ok(window)
    }

    /// The `days` calendar days ending at `to` (inclusive).
    pub fn ending_at(to: NaiveDate, days: u64) -> ResultEngine<Self> {
        let back = days
            .checked_sub(1)
            .ok_or_else(|| EngineError::InvalidInput("window must span at least one day".into()))?;
        let from = to
            .checked_sub_days(Days::new(back))
            .ok_or_else(|| EngineError::InvalidInput("window start out of range".to_string()))?;
        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of days covered, both ends included.
    pub fn len(&self) -> u64 {
        (self.to - self.from).num_days().unsigned_abs() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }

    /// UTC instants `[start, end)` covering the window in `tz`.
    pub fn utc_bounds(&self, tz: Tz) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let after = self
            .to
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidInput("window end out of range".to_string()))?;
        Ok((start_of_day(tz, self.from)?, start_of_day(tz, after)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopCategory {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_spent: Money,
    pub month_to_date: Money,
    pub budgets: Vec<Budget>,
    pub top_categories: Vec<TopCategory>,
}

/// First instant of `day` in `tz`, as UTC.
///
/// When local midnight does not exist (DST gap) the first valid instant of
/// the day is used.
pub fn start_of_day(tz: Tz, day: NaiveDate) -> ResultEngine<DateTime<Utc>> {
    let midnight = day.and_time(NaiveTime::MIN);
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=3).find_map(|hour| {
                let shifted = midnight + chrono::Duration::hours(hour);
                tz.from_local_datetime(&shifted).earliest()
            })
        })
        .ok_or_else(|| EngineError::InvalidInput(format!("no local midnight for {day}")))?;
    Ok(local.with_timezone(&Utc))
}

/// Calendar day of `instant` in `tz`.
pub fn local_day(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// First instant of the month containing `now`, evaluated in `tz`.
pub fn month_start(tz: Tz, now: DateTime<Utc>) -> ResultEngine<DateTime<Utc>> {
    let today = local_day(tz, now);
    let first = today
        .with_day(1)
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid month for {today}")))?;
    start_of_day(tz, first)
}

/// Sum expenses per calendar day over `window`.
///
/// Every day of the window is emitted in ascending order; days without
/// expenses carry a zero total. Expenses outside the window are ignored.
pub fn daily_totals(
    window: DateWindow,
    tz: Tz,
    expenses: &[Expense],
) -> ResultEngine<Vec<DailyTotal>> {
    let mut totals: BTreeMap<NaiveDate, Money> =
        window.days().map(|day| (day, Money::ZERO)).collect();

    for expense in expenses {
        if let Some(total) = totals.get_mut(&local_day(tz, expense.spent_at)) {
            *total = total.try_add(expense.amount)?;
        }
    }

    Ok(totals
        .into_iter()
        .map(|(day, total)| DailyTotal { day, total })
        .collect())
}

/// Build the dashboard for one owner.
///
/// - `total_spent` sums every expense.
/// - `month_to_date` sums expenses in `[month_start(now), now]`.
/// - `top_categories` ranks categorized expenses by total (desc), then name,
///   then id, keeping at most [`TOP_CATEGORIES_LIMIT`] entries.
/// - `budgets` are returned as given.
pub fn dashboard_summary(
    now: DateTime<Utc>,
    tz: Tz,
    expenses: &[Expense],
    categories: &[Category],
    budgets: Vec<Budget>,
) -> ResultEngine<DashboardSummary> {
    let since = month_start(tz, now)?;

    let total_spent = Money::try_sum(expenses.iter().map(|e| e.amount))?;
    let month_to_date = Money::try_sum(
        expenses
            .iter()
            .filter(|e| since <= e.spent_at && e.spent_at <= now)
            .map(|e| e.amount),
    )?;

    let mut per_category: HashMap<Uuid, Money> = HashMap::new();
    for expense in expenses {
        let Some(category_id) = expense.category_id else {
            continue;
        };
        let total = per_category.entry(category_id).or_insert(Money::ZERO);
        *total = total.try_add(expense.amount)?;
    }

    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut top_categories: Vec<TopCategory> = per_category
        .into_iter()
        .filter_map(|(category_id, total)| {
            let category = by_id.get(&category_id)?;
            Some(TopCategory {
                category_id,
                name: category.name.clone(),
                color: category.color.clone(),
                total,
            })
        })
        .collect();

    top_categories.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    top_categories.truncate(TOP_CATEGORIES_LIMIT);

    Ok(DashboardSummary {
        total_spent,
        month_to_date,
        budgets,
        top_categories,
    })
}
