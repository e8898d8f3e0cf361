//! Expenses API endpoints.

use api_types::expense::{ExpenseNew, ExpenseQuery, ExpenseUpdate, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{ExpenseFilter, Money};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        owner_id: expense.owner_id,
        description: expense.description,
        amount_minor: expense.amount.minor(),
        spent_at: expense.spent_at.fixed_offset(),
        category_id: expense.category_id,
    }
}

/// Parse an optional `YYYY-MM-DD` query value.
pub(crate) fn parse_day(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ServerError> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ServerError::Generic(format!("invalid {field}: expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let filter = ExpenseFilter {
        category_id: query.category_id,
        from: parse_day(query.start_date.as_deref(), "start_date")?,
        to: parse_day(query.end_date.as_deref(), "end_date")?,
    };

    let expenses = state
        .engine
        .list_expenses(user.id, &filter)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();
    Ok(Json(expenses))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let spent_at = payload
        .spent_at
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let expense = state
        .engine
        .create_expense(
            user.id,
            engine::ExpenseNew {
                description: payload.description,
                amount: Money::new(payload.amount_minor),
                spent_at,
                category_id: payload.category_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(user.id, expense_id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let category_id = match (payload.category_id, payload.clear_category) {
        (Some(_), true) => {
            return Err(ServerError::Generic(
                "category_id and clear_category are mutually exclusive".to_string(),
            ));
        }
        (Some(id), false) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };

    let expense = state
        .engine
        .update_expense(
            user.id,
            expense_id,
            engine::ExpenseUpdate {
                description: payload.description,
                amount: payload.amount_minor.map(Money::new),
                spent_at: payload.spent_at.map(|at| at.with_timezone(&Utc)),
                category_id,
            },
        )
        .await?;
    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_days() {
        let day = parse_day(Some("2026-03-09"), "start_date").ok().flatten();
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 3, 9));
        assert!(matches!(parse_day(None, "start_date"), Ok(None)));
    }

    #[test]
    fn rejects_malformed_days() {
        assert!(parse_day(Some("09/03/2026"), "end_date").is_err());
        assert!(parse_day(Some("2026-02-30"), "end_date").is_err());
    }
}
