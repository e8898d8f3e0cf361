use chrono_tz::Tz;
use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod budgets;
mod categories;
mod expenses;
mod reports;
mod users;

pub use expenses::{ExpenseFilter, ExpenseNew, ExpenseUpdate};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Owner-scoped access to the record store plus the report operations.
///
/// The engine keeps no per-owner state: every call takes the owner id
/// explicitly and reads what it needs from the database.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Timezone used to turn timestamps into calendar days and months.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    async fn owner_exists<C: ConnectionTrait>(&self, db: &C, owner_id: Uuid) -> ResultEngine<bool> {
        Ok(crate::users::Entity::find_by_id(owner_id).one(db).await?.is_some())
    }

    async fn require_owner(&self, db: &DatabaseTransaction, owner_id: Uuid) -> ResultEngine<()> {
        if !self.owner_exists(db, owner_id).await? {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Load a category only if it belongs to `owner_id`.
    async fn require_category(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<crate::categories::Model> {
        crate::categories::Entity::find_by_id(category_id)
            .filter(crate::categories::Column::OwnerId.eq(owner_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Reporting timezone (defaults to UTC).
    pub fn timezone(mut self, tz: Tz) -> EngineBuilder {
        self.timezone = Some(tz);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            timezone: self.timezone.unwrap_or(Tz::UTC),
        })
    }
}
