use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, Money, ResultEngine,
    expenses::{self, MAX_DESCRIPTION_LEN, validate_amount},
    report::start_of_day,
};

use super::{Engine, with_tx};

/// Input for [`Engine::create_expense`].
#[derive(Clone, Debug)]
pub struct ExpenseNew {
    pub description: String,
    pub amount: Money,
    pub spent_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
}

/// Partial update for [`Engine::update_expense`]; `None` keeps the current
/// value.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub spent_at: Option<DateTime<Utc>>,
    /// `Some(None)` moves the expense to uncategorized.
    pub category_id: Option<Option<Uuid>>,
}

impl ExpenseUpdate {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.spent_at.is_none()
            && self.category_id.is_none()
    }
}

/// Filters for listing expenses.
///
/// `from` and `to` are inclusive calendar days in the reporting timezone.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub category_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn validate_filter(filter: &ExpenseFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidInput(
            "invalid range: start_date must be <= end_date".to_string(),
        ));
    }
    Ok(())
}

fn normalize_description(value: &str) -> ResultEngine<String> {
    let description = value.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::InvalidInput(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

impl Engine {
    /// Record a new expense for `owner_id`.
    ///
    /// A category, when given, must belong to the same owner.
    pub async fn create_expense(&self, owner_id: Uuid, cmd: ExpenseNew) -> ResultEngine<Expense> {
        let expense = Expense::new(
            owner_id,
            normalize_description(&cmd.description)?,
            cmd.amount,
            cmd.spent_at,
            cmd.category_id,
        )?;

        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner_id).await?;
            if let Some(category_id) = expense.category_id {
                self.require_category(&db_tx, owner_id, category_id).await?;
            }
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            tracing::debug!(%owner_id, expense_id = %expense.id, amount = %expense.amount, "created expense");
            Ok(expense)
        })
    }

    pub async fn expense(&self, owner_id: Uuid, expense_id: Uuid) -> ResultEngine<Expense> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .one(&self.database)
            .await?
            .map(Expense::from)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    /// List the owner's expenses, newest first.
    pub async fn list_expenses(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> ResultEngine<Vec<Expense>> {
        validate_filter(filter)?;

        let mut query = expenses::Entity::find().filter(expenses::Column::OwnerId.eq(owner_id));
        if let Some(category_id) = filter.category_id {
            query = query.filter(expenses::Column::CategoryId.eq(category_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(expenses::Column::SpentAt.gte(start_of_day(self.timezone, from)?));
        }
        if let Some(to) = filter.to {
            let after = to
                .succ_opt()
                .ok_or_else(|| EngineError::InvalidInput("end_date out of range".to_string()))?;
            query = query.filter(expenses::Column::SpentAt.lt(start_of_day(self.timezone, after)?));
        }

        Ok(query
            .order_by_desc(expenses::Column::SpentAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::from)
            .collect())
    }

    /// Apply a partial update to an expense.
    pub async fn update_expense(
        &self,
        owner_id: Uuid,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> ResultEngine<Expense> {
        if update.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one field to update".to_string(),
            ));
        }
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id)
                .filter(expenses::Column::OwnerId.eq(owner_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            let mut active: expenses::ActiveModel = model.into();

            if let Some(description) = update.description.as_deref() {
                active.description = ActiveValue::Set(normalize_description(description)?);
            }
            if let Some(amount) = update.amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            if let Some(spent_at) = update.spent_at {
                active.spent_at = ActiveValue::Set(spent_at);
            }
            if let Some(category_id) = update.category_id {
                if let Some(id) = category_id {
                    self.require_category(&db_tx, owner_id, id).await?;
                }
                active.category_id = ActiveValue::Set(category_id);
            }

            let model = active.update(&db_tx).await?;
            Ok(Expense::from(model))
        })
    }

    /// Delete one expense owned by `owner_id`.
    pub async fn delete_expense(&self, owner_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(expense_id))
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_filter_range_is_rejected() {
        let filter = ExpenseFilter {
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(matches!(
            validate_filter(&filter),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ExpenseUpdate::default().is_empty());
        let update = ExpenseUpdate {
            category_id: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn descriptions_are_trimmed_and_capped() {
        assert_eq!(normalize_description("  Bus pass ").unwrap(), "Bus pass");
        let longest = "x".repeat(MAX_DESCRIPTION_LEN);
        assert_eq!(normalize_description(&longest).unwrap(), longest);
        assert!(matches!(
            normalize_description(&"x".repeat(MAX_DESCRIPTION_LEN + 1)),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
