//! Report endpoints: daily totals and the dashboard summary.

use api_types::report::{DailyQuery, DailyTotal, DashboardSummary, TopCategory};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use engine::DateWindow;

use crate::{ServerError, budgets::map_budget, expenses::parse_day, server::ServerState};

/// Days covered by `/expenses/daily` when no start date is given.
const DEFAULT_WINDOW_DAYS: u64 = 7;

pub async fn daily(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyTotal>>, ServerError> {
    let start = parse_day(query.start_date.as_deref(), "start_date")?;
    let end = parse_day(query.end_date.as_deref(), "end_date")?
        .unwrap_or_else(|| engine::report::local_day(state.engine.timezone(), Utc::now()));

    let window = match start {
        Some(start) => DateWindow::new(start, end)?,
        None => DateWindow::ending_at(end, DEFAULT_WINDOW_DAYS)?,
    };

    let totals = state
        .engine
        .daily_totals(user.id, window)
        .await?
        .into_iter()
        .map(|total| DailyTotal {
            day: total.day,
            total_minor: total.total.minor(),
        })
        .collect();
    Ok(Json(totals))
}

pub async fn dashboard(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardSummary>, ServerError> {
    let summary = state.engine.dashboard_summary(user.id, Utc::now()).await?;

    Ok(Json(DashboardSummary {
        total_spent_minor: summary.total_spent.minor(),
        month_to_date_minor: summary.month_to_date.minor(),
        budgets: summary.budgets.into_iter().map(map_budget).collect(),
        top_categories: summary
            .top_categories
            .into_iter()
            .map(|top| TopCategory {
                category_id: top.category_id,
                name: top.name,
                color: top.color,
                total_minor: top.total.minor(),
            })
            .collect(),
    }))
}
