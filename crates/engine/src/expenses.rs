//! The module contains `Expense` and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{Category, categories};

/// A single spending record, always filed under one category.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub id: i32,
    pub title: String,
    pub amount: f64,
    /// When the money was spent. Defaults to the creation time.
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub category_id: i32,
    pub category: Category,
}

impl From<(Model, categories::Model)> for Expense {
    fn from((model, category): (Model, categories::Model)) -> Self {
        Self {
            id: model.id,
            title: model.title,
            amount: model.amount,
            date: model.date,
            notes: model.notes,
            category_id: model.category_id,
            category: category.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
