use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, Expense, ResultEngine, categories, expenses,
    report::{self, DailyTotal, DashboardSummary, DateWindow},
};

use super::{Engine, with_tx};

impl Engine {
    /// Per-day spending totals over `window` (see [`report::daily_totals`]).
    ///
    /// An unknown owner yields an empty sequence rather than an error.
    pub async fn daily_totals(
        &self,
        owner_id: Uuid,
        window: DateWindow,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let (start, end) = window.utc_bounds(self.timezone)?;

        with_tx!(self, |db_tx| {
            if !self.owner_exists(&db_tx, owner_id).await? {
                tracing::debug!(%owner_id, "daily totals requested for unknown owner");
                return Ok(Vec::new());
            }

            let rows: Vec<Expense> = expenses::Entity::find()
                .filter(expenses::Column::OwnerId.eq(owner_id))
                .filter(expenses::Column::SpentAt.gte(start))
                .filter(expenses::Column::SpentAt.lt(end))
                .order_by_asc(expenses::Column::SpentAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::from)
                .collect();

            report::daily_totals(window, self.timezone, &rows)
        })
    }

    /// Dashboard summary as of `now` (see [`report::dashboard_summary`]).
    ///
    /// All rows are read inside one transaction so the totals, ranking and
    /// budgets describe the same snapshot.
    pub async fn dashboard_summary(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<DashboardSummary> {
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner_id).await?;

            let rows: Vec<Expense> = expenses::Entity::find()
                .filter(expenses::Column::OwnerId.eq(owner_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::from)
                .collect();
            let owned_categories: Vec<Category> = categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::from)
                .collect();
            let budgets = self.load_budgets(&db_tx, owner_id).await?;

            let summary =
                report::dashboard_summary(now, self.timezone, &rows, &owned_categories, budgets)?;
            tracing::debug!(
                %owner_id,
                expenses = rows.len(),
                total_spent = %summary.total_spent,
                "computed dashboard summary"
            );
            Ok(summary)
        })
    }
}
