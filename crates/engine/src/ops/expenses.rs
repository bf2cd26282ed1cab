use api_types::expense::{ExpenseNew, ExpenseQuery, ExpenseUpdate};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{EngineError, Expense, ResultEngine, categories, expenses, validation};

use super::{Engine, set_patch, with_tx};

fn joined(row: (expenses::Model, Option<categories::Model>)) -> ResultEngine<Expense> {
    match row {
        (model, Some(category)) => Ok(Expense::from((model, category))),
        (model, None) => Err(EngineError::NotFound(format!(
            "category {}",
            model.category_id
        ))),
    }
}

async fn require_category<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))
}

impl Engine {
    /// Record a new expense. Without a `date` the server time is used.
    pub async fn create_expense(&self, input: ExpenseNew) -> ResultEngine<Expense> {
        validation::expense_new(&input)?;
        with_tx!(self, |db_tx| {
            let category = require_category(&db_tx, input.category_id).await?;

            let active = expenses::ActiveModel {
                title: ActiveValue::Set(input.title),
                amount: ActiveValue::Set(input.amount),
                date: ActiveValue::Set(input.date.unwrap_or_else(Utc::now)),
                notes: ActiveValue::Set(input.notes),
                category_id: ActiveValue::Set(category.id),
                ..Default::default()
            };
            let model = active.insert(&db_tx).await?;
            Ok(Expense::from((model, category)))
        })
    }

    /// Return an expense with its category.
    pub async fn expense(&self, expense_id: i32) -> ResultEngine<Expense> {
        let row = expenses::Entity::find_by_id(expense_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("expense {expense_id}")))?;
        joined(row)
    }

    pub async fn list_expenses(&self, query: ExpenseQuery) -> ResultEngine<Vec<Expense>> {
        let page = query.page();
        let mut select = expenses::Entity::find();
        if let Some(category_id) = query.category_id {
            select = select.filter(expenses::Column::CategoryId.eq(category_id));
        }
        let rows = select
            .find_also_related(categories::Entity)
            .order_by_asc(expenses::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        rows.into_iter().map(joined).collect()
    }

    /// Apply the supplied fields of `changes` to an expense.
    ///
    /// Fields absent from `changes` keep their stored value. Moving the
    /// expense to another category requires that category to exist.
    pub async fn update_expense(
        &self,
        expense_id: i32,
        changes: ExpenseUpdate,
    ) -> ResultEngine<Expense> {
        validation::expense_update(&changes)?;
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("expense {expense_id}")))?;

            let category_id = *changes.category_id.or(&model.category_id);
            let category = require_category(&db_tx, category_id).await?;

            let mut active: expenses::ActiveModel = model.clone().into();
            set_patch(&mut active.title, changes.title);
            set_patch(&mut active.amount, changes.amount);
            set_patch(&mut active.date, changes.date);
            set_patch(&mut active.notes, changes.notes);
            set_patch(&mut active.category_id, changes.category_id);

            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            Ok(Expense::from((model, category)))
        })
    }

    pub async fn delete_expense(&self, expense_id: i32) -> ResultEngine<()> {
        let result = expenses::Entity::delete_by_id(expense_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("expense {expense_id}")));
        }
        Ok(())
    }
}
