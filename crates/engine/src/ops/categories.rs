use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, budgets, categories, expenses,
    util::{normalize_category_key, normalize_color, normalize_display_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a category for `owner_id`.
    ///
    /// Names are unique per owner after normalization (case and accents are
    /// ignored).
    pub async fn create_category(
        &self,
        owner_id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> ResultEngine<Category> {
        let display = normalize_display_name(name, "category")?;
        let name_norm = normalize_category_key(&display)?;
        let color = normalize_color(color)?.unwrap_or_else(|| categories::DEFAULT_COLOR.to_string());

        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner_id).await?;
            self.ensure_name_free(&db_tx, owner_id, &name_norm, None)
                .await?;

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner_id: ActiveValue::Set(owner_id),
                name: ActiveValue::Set(display),
                name_norm: ActiveValue::Set(name_norm),
                color: ActiveValue::Set(color),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    /// List the owner's categories ordered by name.
    pub async fn list_categories(&self, owner_id: Uuid) -> ResultEngine<Vec<Category>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    /// Rename and/or recolor a category.
    pub async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> ResultEngine<Category> {
        if name.is_none() && color.is_none() {
            return Err(EngineError::InvalidInput(
                "provide at least one of name or color".to_string(),
            ));
        }
        let renamed = match name {
            Some(name) => {
                let display = normalize_display_name(name, "category")?;
                let norm = normalize_category_key(&display)?;
                Some((display, norm))
            }
            None => None,
        };
        let color = normalize_color(color)?;

        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, owner_id, category_id).await?;
            let mut active: categories::ActiveModel = model.into();

            if let Some((display, norm)) = renamed {
                self.ensure_name_free(&db_tx, owner_id, &norm, Some(category_id))
                    .await?;
                active.name = ActiveValue::Set(display);
                active.name_norm = ActiveValue::Set(norm);
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(color);
            }

            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Delete a category.
    ///
    /// Expenses filed under it become uncategorized and budgets bound to it
    /// become overall budgets.
    pub async fn delete_category(&self, owner_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, owner_id, category_id).await?;

            expenses::Entity::update_many()
                .col_expr(expenses::Column::CategoryId, Expr::value(Option::<Uuid>::None))
                .filter(expenses::Column::OwnerId.eq(owner_id))
                .filter(expenses::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::update_many()
                .col_expr(budgets::Column::CategoryId, Expr::value(Option::<Uuid>::None))
                .filter(budgets::Column::OwnerId.eq(owner_id))
                .filter(budgets::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(%owner_id, %category_id, "deleted category");
            Ok(())
        })
    }

    async fn ensure_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: Uuid,
        name_norm: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if let Some(existing) = query.one(db_tx).await? {
            return Err(EngineError::ExistingKey(format!(
                "category '{}'",
                existing.name
            )));
        }
        Ok(())
    }
}
