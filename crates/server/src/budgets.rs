//! Budgets API endpoints.

use api_types::budget::{BudgetNew, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_budget(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        owner_id: budget.owner_id,
        month: budget.month,
        amount_minor: budget.amount.minor(),
        category_id: budget.category_id,
    }
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state
        .engine
        .list_budgets(user.id)
        .await?
        .into_iter()
        .map(map_budget)
        .collect();
    Ok(Json(budgets))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state
        .engine
        .create_budget(
            user.id,
            payload.month,
            Money::new(payload.amount_minor),
            payload.category_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_budget(budget))))
}

pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(user.id, budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
