//! Expenses API endpoints.

use api_types::expense::{ExpenseNew, ExpenseQuery, ExpenseUpdate, ExpenseView};
use axum::{extract::State, http::StatusCode};

use crate::{
    ServerError,
    categories::map_category,
    extract::{Json, Path, Query},
    server::ServerState,
};

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        title: expense.title,
        amount: expense.amount,
        date: expense.date,
        notes: expense.notes,
        category_id: expense.category_id,
        category: map_category(expense.category),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(query)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();
    Ok(Json(expenses))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state.engine.create_expense(payload).await?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(expense_id).await?;
    Ok(Json(map_expense(expense)))
}

/// Serves both PUT and PATCH; only the keys present in the body change.
pub async fn update(
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.update_expense(expense_id, payload).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
