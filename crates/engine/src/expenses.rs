//! Expense primitives.
//!
//! An `Expense` is a single outgoing amount recorded by its owner, optionally
//! filed under one of the owner's categories. Amounts are stored as minor
//! units and are always positive.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub amount: Money,
    pub spent_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
}

impl Expense {
    pub fn new(
        owner_id: Uuid,
        description: String,
        amount: Money,
        spent_at: DateTime<Utc>,
        category_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        validate_amount(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            description,
            amount,
            spent_at,
            category_id,
        })
    }
}

/// Largest amount accepted for a single expense or budget (9_999_999_999.99).
pub const MAX_AMOUNT_MINOR: i64 = 999_999_999_999;

/// Longest expense description accepted, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

pub(crate) fn validate_amount(amount: Money) -> ResultEngine<()> {
    if amount.minor() <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    if amount.minor() > MAX_AMOUNT_MINOR {
        return Err(EngineError::InvalidAmount(format!(
            "amount_minor must be <= {MAX_AMOUNT_MINOR}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub amount_minor: i64,
    pub spent_at: DateTimeUtc,
    pub category_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            owner_id: ActiveValue::Set(expense.owner_id),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            spent_at: ActiveValue::Set(expense.spent_at),
            category_id: ActiveValue::Set(expense.category_id),
        }
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            description: model.description,
            amount: Money::new(model.amount_minor),
            spent_at: model.spent_at,
            category_id: model.category_id,
        }
    }
}
