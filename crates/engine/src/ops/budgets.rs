use chrono::{Datelike, NaiveDate};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Budget, EngineError, Money, ResultEngine, budgets, expenses::validate_amount};

use super::{Engine, with_tx};

fn first_of_month(day: NaiveDate) -> ResultEngine<NaiveDate> {
    day.with_day(1)
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid month: {day}")))
}

impl Engine {
    /// Create a budget for the month containing `month`.
    ///
    /// `category_id = None` is an overall budget. One budget per
    /// (category, month) is allowed.
    pub async fn create_budget(
        &self,
        owner_id: Uuid,
        month: NaiveDate,
        amount: Money,
        category_id: Option<Uuid>,
    ) -> ResultEngine<Budget> {
        validate_amount(amount)?;
        let month = first_of_month(month)?;

        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner_id).await?;
            if let Some(id) = category_id {
                self.require_category(&db_tx, owner_id, id).await?;
            }

            let mut query = budgets::Entity::find()
                .filter(budgets::Column::OwnerId.eq(owner_id))
                .filter(budgets::Column::Month.eq(month));
            query = match category_id {
                Some(id) => query.filter(budgets::Column::CategoryId.eq(id)),
                None => query.filter(budgets::Column::CategoryId.is_null()),
            };
            if query.one(&db_tx).await?.is_some() {
                return Err(EngineError::ExistingKey(format!("budget for {month}")));
            }

            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner_id: ActiveValue::Set(owner_id),
                month: ActiveValue::Set(month),
                amount_minor: ActiveValue::Set(amount.minor()),
                category_id: ActiveValue::Set(category_id),
            }
            .insert(&db_tx)
            .await?;
            Ok(Budget::from(model))
        })
    }

    /// List the owner's budgets, most recent month first.
    pub async fn list_budgets(&self, owner_id: Uuid) -> ResultEngine<Vec<Budget>> {
        self.load_budgets(&self.database, owner_id).await
    }

    pub(super) async fn load_budgets<C: ConnectionTrait>(
        &self,
        db: &C,
        owner_id: Uuid,
    ) -> ResultEngine<Vec<Budget>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::OwnerId.eq(owner_id))
            .order_by_desc(budgets::Column::Month)
            .order_by_asc(budgets::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Budget::from)
            .collect())
    }

    pub async fn delete_budget(&self, owner_id: Uuid, budget_id: Uuid) -> ResultEngine<()> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id))
            .filter(budgets::Column::OwnerId.eq(owner_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("budget not exists".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_are_normalized_to_first_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            first_of_month(day).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }
}
