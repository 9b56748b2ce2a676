use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Datelike;

use crate::{
    AppState,
    api::models::{
        budgets::{BudgetResponse, BudgetSet, BudgetSetResponse, BudgetState, BudgetStatusResponse, BudgetTotalResponse},
        summaries::CategoryQuery,
        users::CurrentUser,
    },
    db::{
        handlers::{Budgets, Expenses, expenses::ExpenseFilter},
        models::budgets::BudgetUpsertDBRequest,
    },
    errors::{Error, Result},
    types::{month_bounds, today},
    validation::required_category,
};

const NO_BUDGET: &str = "No budget found for this category";

/// Set this month's budget for a category, replacing any existing one
#[utoipa::path(
    post,
    path = "/api/budget/set/",
    request_body = BudgetSet,
    tag = "budgets",
    responses(
        (status = 201, description = "Budget set", body = BudgetSetResponse),
        (status = 400, description = "Per-field validation errors"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn set_budget(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: std::result::Result<Json<BudgetSet>, JsonRejection>,
) -> Result<(StatusCode, Json<BudgetSetResponse>)> {
    let Json(request) = payload?;
    let (category, amount) = request.validate()?;
    let now = today();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let budget = Budgets::new(&mut conn, current_user.id)
        .upsert(&BudgetUpsertDBRequest {
            category,
            amount,
            date: now,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BudgetSetResponse {
            message: "Budget set successfully".to_string(),
            category: budget.category,
            amount: budget.amount,
            month: budget.period.format("%B").to_string(),
            year: budget.period.year(),
        }),
    ))
}

/// The most recently dated budget for a category
#[utoipa::path(
    get,
    path = "/api/budget/get/",
    tag = "budgets",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Latest budget", body = BudgetResponse),
        (status = 400, description = "Missing or unknown category"),
        (status = 404, description = "No budget was ever set for this category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_budget(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<BudgetResponse>> {
    let Query(query) = query?;
    let category = required_category(query.category.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let budget = Budgets::new(&mut conn, current_user.id)
        .latest(category)
        .await?
        .ok_or_else(|| Error::not_found(NO_BUDGET))?;

    Ok(Json(BudgetResponse {
        category: budget.category,
        budget_amount: budget.amount,
        date: budget.date,
    }))
}

/// Compare the latest budget for a category with this month's spending
#[utoipa::path(
    get,
    path = "/api/budget/status/",
    tag = "budgets",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Budget status", body = BudgetStatusResponse),
        (status = 400, description = "Missing or unknown category"),
        (status = 404, description = "No budget was ever set for this category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn budget_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<BudgetStatusResponse>> {
    let Query(query) = query?;
    let category = required_category(query.category.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let budget = Budgets::new(&mut conn, current_user.id)
        .latest(category)
        .await?
        .ok_or_else(|| Error::not_found(NO_BUDGET))?;

    let (first, last) = month_bounds(today());
    let total_spent = Expenses::new(&mut conn, current_user.id)
        .sum(&ExpenseFilter::default().category(category).between(first, last))
        .await?;

    let remaining_budget = budget.amount - total_spent;

    Ok(Json(BudgetStatusResponse {
        category,
        budget_amount: budget.amount,
        total_spent,
        remaining_budget,
        status: BudgetState::for_remaining(remaining_budget),
    }))
}

/// Sum of every budget the caller has set, across all months
#[utoipa::path(
    get,
    path = "/api/expenses/budget/total/",
    tag = "budgets",
    responses((status = 200, description = "Total budget", body = BudgetTotalResponse)),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn total_budget(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<BudgetTotalResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let total_budget = Budgets::new(&mut conn, current_user.id).total().await?;

    Ok(Json(BudgetTotalResponse { total_budget }))
}

/// Delete this month's budget for a category
#[utoipa::path(
    delete,
    path = "/api/budget/delete/{category}/",
    tag = "budgets",
    params(("category" = String, Path, description = "Expense category, case-insensitive")),
    responses(
        (status = 204, description = "Budget deleted"),
        (status = 404, description = "No budget for this category this month"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_budget(State(state): State<AppState>, current_user: CurrentUser, Path(category): Path<String>) -> Result<StatusCode> {
    let not_found = || Error::not_found("Budget not found");
    // An unknown category can never have a budget
    let category = category.parse().map_err(|_| not_found())?;
    let (period, _) = month_bounds(today());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Budgets::new(&mut conn, current_user.id).delete_for_period(category, period).await? {
        return Err(not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
