use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        expenses::{DescriptionUpdate, DescriptionUpdateResponse, ExpenseCreate, ExpenseDeleteResponse, ExpenseResponse, UpdatedExpense},
        users::CurrentUser,
    },
    db::{
        handlers::{
            Expenses, Repository,
            expenses::{ExpenseFilter, ExpenseOrder},
        },
        models::expenses::ExpenseUpdateDBRequest,
    },
    errors::{Error, Result},
    types::{ExpenseId, today},
    validation::{FieldValidator, required_category},
};

fn not_owned(id: ExpenseId) -> Error {
    Error::not_found(format!("Expense with ID {id} not found or unauthorized"))
}

/// Record a new expense
#[utoipa::path(
    post,
    path = "/api/expenses/add/",
    request_body = ExpenseCreate,
    tag = "expenses",
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Per-field validation errors"),
        (status = 401, description = "Missing or unknown token"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn add_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: std::result::Result<Json<ExpenseCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseResponse>)> {
    let Json(request) = payload?;
    let request = request.validate(today())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let expense = Expenses::new(&mut conn, current_user.id).create(&request).await?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(expense))))
}

/// List the caller's expenses in one category
#[utoipa::path(
    get,
    path = "/api/expenses/category/{category}/",
    tag = "expenses",
    params(("category" = String, Path, description = "Expense category, case-insensitive")),
    responses(
        (status = 200, description = "Expenses in insertion order", body = [ExpenseResponse]),
        (status = 400, description = "Unknown category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_by_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category): Path<String>,
) -> Result<Json<Vec<ExpenseResponse>>> {
    let category = required_category(Some(&category))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let expenses = Expenses::new(&mut conn, current_user.id)
        .list(&ExpenseFilter::default().category(category).ordered_by(ExpenseOrder::Id))
        .await?;

    Ok(Json(expenses.into_iter().map(ExpenseResponse::from).collect()))
}

/// Delete one of the caller's expenses
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}/",
    tag = "expenses",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted", body = ExpenseDeleteResponse),
        (status = 404, description = "No such expense for this user"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    id: std::result::Result<Path<ExpenseId>, PathRejection>,
) -> Result<Json<ExpenseDeleteResponse>> {
    let Path(id) = id?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut tx, current_user.id);

    let expense = repo.get_by_id(id).await?.ok_or_else(|| not_owned(id))?;
    if !repo.delete(id).await? {
        return Err(not_owned(id));
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ExpenseDeleteResponse {
        message: format!("Expense with ID {id} has been deleted"),
        deleted_expense: expense.into(),
    }))
}

/// Replace the description of one of the caller's expenses
#[utoipa::path(
    put,
    path = "/api/expenses/{id}/description/",
    request_body = DescriptionUpdate,
    tag = "expenses",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Description updated", body = DescriptionUpdateResponse),
        (status = 400, description = "New description missing"),
        (status = 404, description = "No such expense for this user"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_description(
    State(state): State<AppState>,
    current_user: CurrentUser,
    id: std::result::Result<Path<ExpenseId>, PathRejection>,
    payload: std::result::Result<Json<DescriptionUpdate>, JsonRejection>,
) -> Result<Json<DescriptionUpdateResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let new_description = request
        .new_description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| Error::bad_request("New description is required"))?;
    let mut v = FieldValidator::new();
    v.text("new_description", Some(&new_description));
    v.finish()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut tx, current_user.id);

    let before = repo.get_by_id(id).await?.ok_or_else(|| not_owned(id))?;
    let after = repo
        .update(
            id,
            &ExpenseUpdateDBRequest {
                description: Some(new_description),
            },
        )
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(DescriptionUpdateResponse {
        message: format!("Description for expense ID {id} has been updated"),
        updated_expense: UpdatedExpense {
            id: after.id,
            category: after.category,
            amount: after.amount,
            date: after.date,
            old_description: before.description,
            new_description: after.description,
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_authenticated_user, create_test_app};
    use axum::http::{StatusCode, header::AUTHORIZATION};
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_add_then_list_by_category(pool: PgPool) {
        let (user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "category": "Food", "amount": "12.50", "date": "2024-03-01" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["user"], json!(user.id));
        assert_eq!(created["category"], "Food");
        assert_eq!(created["amount"], "12.50");
        assert_eq!(created["date"], "2024-03-01");
        assert_eq!(created["description"], Value::Null);

        let response = server.get("/api/expenses/category/Food/").add_header(AUTHORIZATION, auth.clone()).await;
        response.assert_status_ok();
        response.assert_json(&json!([created]));

        // Lower-case path segment resolves to the same category
        let listed: Value = server.get("/api/expenses/category/food/").add_header(AUTHORIZATION, auth).await.json();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_add_rejects_invalid_fields(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "category": "Rent", "amount": "1.999", "date": "2024/03/01" }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["category"][0].as_str().unwrap().starts_with("Invalid category 'Rent'"));
        assert_eq!(body["amount"], json!(["Ensure that there are no more than 2 decimal places."]));
        assert_eq!(body["date"], json!(["Invalid date format, use YYYY-MM-DD"]));

        let response = server
            .get("/api/expenses/category/Rent/")
            .add_header(AUTHORIZATION, auth)
            .await;
        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_expense(pool: PgPool) {
        let (_alice, alice_auth) = create_authenticated_user(&pool, "alice").await;
        let (_bob, bob_auth) = create_authenticated_user(&pool, "bob").await;
        let server = create_test_app(pool).await;

        let created: Value = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, alice_auth.clone())
            .json(&json!({ "category": "Transport", "amount": 3, "date": "2024-03-02", "description": "bus" }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = server.delete(&format!("/api/expenses/{id}/")).add_header(AUTHORIZATION, bob_auth).await;
        response.assert_status_not_found();
        response.assert_json(&json!({ "error": format!("Expense with ID {id} not found or unauthorized") }));

        let response = server.delete(&format!("/api/expenses/{id}/")).add_header(AUTHORIZATION, alice_auth.clone()).await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "message": format!("Expense with ID {id} has been deleted"),
            "deleted_expense": {
                "id": id,
                "category": "Transport",
                "amount": "3.00",
                "date": "2024-03-02",
                "description": "bus"
            }
        }));

        server
            .delete(&format!("/api/expenses/{id}/"))
            .add_header(AUTHORIZATION, alice_auth)
            .await
            .assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_description(pool: PgPool) {
        let (_alice, alice_auth) = create_authenticated_user(&pool, "alice").await;
        let (_bob, bob_auth) = create_authenticated_user(&pool, "bob").await;
        let server = create_test_app(pool).await;

        let created: Value = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, alice_auth.clone())
            .json(&json!({ "category": "School", "amount": "20", "date": "2024-03-02", "description": "books" }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();
        let path = format!("/api/expenses/{id}/description/");

        let response = server
            .put(&path)
            .add_header(AUTHORIZATION, alice_auth.clone())
            .json(&json!({ "new_description": "" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "New description is required" }));

        server
            .put(&path)
            .add_header(AUTHORIZATION, bob_auth)
            .json(&json!({ "new_description": "stolen" }))
            .await
            .assert_status_not_found();

        let response = server
            .put(&path)
            .add_header(AUTHORIZATION, alice_auth)
            .json(&json!({ "new_description": "textbooks" }))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "message": format!("Description for expense ID {id} has been updated"),
            "updated_expense": {
                "id": id,
                "category": "School",
                "amount": "20.00",
                "date": "2024-03-02",
                "old_description": "books",
                "new_description": "textbooks"
            }
        }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_text_fields_reject_nul(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "category": "Food", "amount": "5", "description": "a\0b" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "description": ["Null characters are not allowed."] }));

        let created: Value = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "category": "Food", "amount": "5", "description": "lunch" }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/expenses/{id}/description/"))
            .add_header(AUTHORIZATION, auth)
            .json(&json!({ "new_description": "x\0y" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "new_description": ["Null characters are not allowed."] }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_non_numeric_id_is_bad_request(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let response = server.delete("/api/expenses/abc/").add_header(AUTHORIZATION, auth).await;
        response.assert_status_bad_request();
    }
}
