use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{Category, EngineError, Page, ResultEngine, categories, expenses, validation};

use super::{Engine, with_tx};

/// Categories created by [`Engine::seed_default_categories`].
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Food & Dining",
    "Transportation",
    "Entertainment",
    "Housing",
    "Utilities",
    "Healthcare",
    "Personal Care",
    "Education",
    "Travel",
    "Shopping",
    "Gifts & Donations",
    "Miscellaneous",
];

fn name_conflict(name: &str) -> (&'static str, String) {
    ("name", format!("category '{name}' already exists"))
}

impl Engine {
    /// Add a new category. Names are trimmed and must be unique.
    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let name = validation::category_name(name)?;
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::Name.eq(name.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                let (field, message) = name_conflict(&name);
                return Err(EngineError::conflict(field, message));
            }

            let active = categories::ActiveModel {
                name: ActiveValue::Set(name.clone()),
                ..Default::default()
            };
            let model = active
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_unique_violation(err, |_| name_conflict(&name)))?;
            Ok(Category::from(model))
        })
    }

    pub async fn category(&self, category_id: i32) -> ResultEngine<Category> {
        categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .map(Category::from)
            .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))
    }

    pub async fn category_by_name(&self, name: &str) -> ResultEngine<Option<Category>> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name.trim()))
            .one(&self.database)
            .await?;
        Ok(model.map(Category::from))
    }

    pub async fn list_categories(&self, page: Page) -> ResultEngine<Vec<Category>> {
        let rows = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Delete a category.
    ///
    /// A category that still files expenses is kept and the call fails with
    /// a conflict, so no expense is ever left pointing at a missing category.
    pub async fn delete_category(&self, category_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))?;

            let in_use = expenses::Entity::find()
                .filter(expenses::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::conflict(
                    "category_id",
                    format!("category '{}' still has {in_use} expenses", model.name),
                ));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Insert the [`DEFAULT_CATEGORIES`] that are missing.
    ///
    /// Returns how many were inserted; running it again inserts nothing.
    pub async fn seed_default_categories(&self) -> ResultEngine<usize> {
        with_tx!(self, |db_tx| {
            let mut inserted = 0;
            for name in DEFAULT_CATEGORIES {
                let exists = categories::Entity::find()
                    .filter(categories::Column::Name.eq(name))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    continue;
                }
                categories::ActiveModel {
                    name: ActiveValue::Set(name.to_string()),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;
                inserted += 1;
            }
            tracing::info!("seeded {inserted} default categories");
            Ok(inserted)
        })
    }
}
