//! Read-only aggregate views over the caller's expenses.
//!
//! Every sum comes back as `"0.00"` when nothing matches. "Current month" is the UTC
//! calendar month at the time of the request.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use chrono::Datelike;

use crate::{
    AppState,
    api::models::{
        summaries::{
            CategoryBreakdownResponse, CategoryHistoryResponse, CategoryMonthTotalResponse, CategoryQuery, DailySummaryResponse,
            DateQuery, DateRangeQuery, DateRangeSummaryResponse, DateSummaryResponse, HighestExpenseResponse,
            MonthlyCategoryResponse, MonthlyExpenseResponse, TotalExpensesResponse, YearlyExpenseResponse,
        },
        users::CurrentUser,
    },
    db::handlers::{
        Expenses, Repository,
        expenses::{ExpenseFilter, ExpenseOrder},
    },
    errors::{Error, Result},
    types::{month_bounds, today, year_bounds},
    validation::{parse_date, required_category, required_date},
};

/// Total spent in the current month
#[utoipa::path(
    get,
    path = "/api/expenses/summary/month/",
    tag = "summaries",
    responses((status = 200, description = "Current month total", body = MonthlyExpenseResponse)),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn monthly_expense(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<MonthlyExpenseResponse>> {
    let (first, last) = month_bounds(today());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let monthly_expense = Expenses::new(&mut conn, current_user.id)
        .sum(&ExpenseFilter::default().between(first, last))
        .await?;

    Ok(Json(MonthlyExpenseResponse { monthly_expense }))
}

/// Total spent in a calendar year
#[utoipa::path(
    get,
    path = "/api/expenses/yearly-summary/{year}/",
    tag = "summaries",
    params(("year" = i32, Path, description = "Calendar year, e.g. 2024")),
    responses(
        (status = 200, description = "Year total", body = YearlyExpenseResponse),
        (status = 400, description = "Year is not a valid number"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn yearly_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    year: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<YearlyExpenseResponse>> {
    let Path(year) = year?;
    let (first, last) = year_bounds(year).ok_or_else(|| Error::bad_request(format!("Year {year} is out of range")))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let yearly_expense = Expenses::new(&mut conn, current_user.id)
        .sum(&ExpenseFilter::default().between(first, last))
        .await?;

    Ok(Json(YearlyExpenseResponse { year, yearly_expense }))
}

/// Expenses and total for a single day
#[utoipa::path(
    get,
    path = "/api/expenses/daily-summary/",
    tag = "summaries",
    params(DateQuery),
    responses(
        (status = 200, description = "Day summary", body = DailySummaryResponse),
        (status = 400, description = "Missing or malformed date"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn daily_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<DailySummaryResponse>> {
    let Query(query) = query?;
    let date = required_date(query.date.as_deref())?;
    let filter = ExpenseFilter::default().on(date);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut conn, current_user.id);
    let total_spent = repo.sum(&filter).await?;
    let expenses = repo.list(&filter).await?;

    Ok(Json(DailySummaryResponse {
        date,
        total_spent,
        expenses: expenses.into_iter().map(Into::into).collect(),
    }))
}

/// Expenses and total over an inclusive date range
#[utoipa::path(
    get,
    path = "/api/expenses/search/",
    tag = "summaries",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Range summary", body = DateRangeSummaryResponse),
        (status = 400, description = "Missing, malformed or inverted dates"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<DateRangeSummaryResponse>> {
    let Query(query) = query?;
    let present = |raw: Option<String>| raw.filter(|s| !s.trim().is_empty());
    let (Some(start), Some(end)) = (present(query.start_date), present(query.end_date)) else {
        return Err(Error::bad_request("Both start_date and end_date are required"));
    };
    let start_date = parse_date(&start).map_err(Error::bad_request)?;
    let end_date = parse_date(&end).map_err(Error::bad_request)?;
    if start_date > end_date {
        return Err(Error::bad_request("start_date cannot be after end_date"));
    }

    let filter = ExpenseFilter::default()
        .between(start_date, end_date)
        .ordered_by(ExpenseOrder::Date);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut conn, current_user.id);
    let total_spent = repo.sum(&filter).await?;
    let expenses = repo.list(&filter).await?;

    Ok(Json(DateRangeSummaryResponse {
        start_date,
        end_date,
        total_spent,
        expenses: expenses.into_iter().map(Into::into).collect(),
    }))
}

/// All-time totals per category, largest first
#[utoipa::path(
    get,
    path = "/api/expenses/category-breakdown/",
    tag = "summaries",
    responses((status = 200, description = "Per-category totals", body = CategoryBreakdownResponse)),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn category_breakdown(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<CategoryBreakdownResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let totals = Expenses::new(&mut conn, current_user.id)
        .category_totals(&ExpenseFilter::default())
        .await?;

    Ok(Json(CategoryBreakdownResponse {
        total_categories: totals.len(),
        breakdown: totals.into_iter().map(Into::into).collect(),
    }))
}

/// The caller's single largest expense
#[utoipa::path(
    get,
    path = "/api/expenses/highest/",
    tag = "summaries",
    responses(
        (status = 200, description = "Largest expense", body = HighestExpenseResponse),
        (status = 404, description = "The caller has no expenses"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn highest(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<HighestExpenseResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let expense = Expenses::new(&mut conn, current_user.id)
        .highest()
        .await?
        .ok_or_else(|| Error::not_found("No expenses found for this user"))?;

    Ok(Json(expense.into()))
}

/// All-time total, optionally limited to one category
#[utoipa::path(
    get,
    path = "/api/expenses/total/",
    tag = "summaries",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Total", body = TotalExpensesResponse),
        (status = 400, description = "Unknown category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn total(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<TotalExpensesResponse>> {
    let Query(query) = query?;
    let category = match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => Some(required_category(Some(raw))?),
        None => None,
    };
    let filter = ExpenseFilter {
        category,
        ..Default::default()
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let total_expenses = Expenses::new(&mut conn, current_user.id).sum(&filter).await?;

    Ok(Json(TotalExpensesResponse { category, total_expenses }))
}

/// Total for one category in the current month
#[utoipa::path(
    get,
    path = "/api/expenses/category-current-month/",
    tag = "summaries",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Category total this month", body = CategoryMonthTotalResponse),
        (status = 400, description = "Missing or unknown category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn category_current_month(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<CategoryMonthTotalResponse>> {
    let Query(query) = query?;
    let category = required_category(query.category.as_deref())?;
    let now = today();
    let (first, last) = month_bounds(now);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let total_expense = Expenses::new(&mut conn, current_user.id)
        .sum(&ExpenseFilter::default().category(category).between(first, last))
        .await?;

    Ok(Json(CategoryMonthTotalResponse {
        category,
        month: now.format("%B").to_string(),
        year: now.year(),
        total_expense,
    }))
}

/// Every expense in a category, oldest first
#[utoipa::path(
    get,
    path = "/api/expenses/history/",
    tag = "summaries",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Category history", body = CategoryHistoryResponse),
        (status = 400, description = "Missing or unknown category"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<CategoryHistoryResponse>> {
    let Query(query) = query?;
    let category = required_category(query.category.as_deref())?;
    let filter = ExpenseFilter::default().category(category).ordered_by(ExpenseOrder::Date);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut conn, current_user.id);
    let total_expenses = repo.sum(&filter).await?;
    let history = repo.list(&filter).await?;

    Ok(Json(CategoryHistoryResponse {
        category,
        total_expenses,
        history: history.into_iter().map(Into::into).collect(),
    }))
}

/// Expenses and total recorded on an exact date
#[utoipa::path(
    get,
    path = "/api/expenses/summary-by-date/",
    tag = "summaries",
    params(DateQuery),
    responses(
        (status = 200, description = "Date summary", body = DateSummaryResponse),
        (status = 400, description = "Missing or malformed date"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn summary_by_date(
    State(state): State<AppState>,
    current_user: CurrentUser,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<DateSummaryResponse>> {
    let Query(query) = query?;
    let date = required_date(query.date.as_deref())?;
    let filter = ExpenseFilter::default().on(date);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut conn, current_user.id);
    let total_expense = repo.sum(&filter).await?;
    let expenses = repo.list(&filter).await?;

    Ok(Json(DateSummaryResponse {
        date,
        total_expense,
        expenses: expenses.into_iter().map(Into::into).collect(),
    }))
}

/// Per-category totals and grand total for the current month
///
/// Served on both `/api/expenses/monthly/` and `/api/expenses/monthly-category/`. A
/// `category` query parameter is accepted and ignored.
#[utoipa::path(
    get,
    path = "/api/expenses/monthly/",
    tag = "summaries",
    responses((status = 200, description = "Current month breakdown", body = MonthlyCategoryResponse)),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn monthly_category(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<MonthlyCategoryResponse>> {
    let now = today();
    let (first, last) = month_bounds(now);
    let filter = ExpenseFilter::default().between(first, last);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Expenses::new(&mut conn, current_user.id);
    let category_expenses = repo.category_totals(&filter).await?;
    let total_expenses = repo.sum(&filter).await?;

    Ok(Json(MonthlyCategoryResponse {
        month: now.format("%B %Y").to_string(),
        category_expenses: category_expenses.into_iter().map(Into::into).collect(),
        total_expenses,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_authenticated_user, create_test_app};
    use crate::types::today;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use axum_test::TestServer;
    use chrono::{Datelike, Days};
    use serde_json::{Value, json};
    use sqlx::PgPool;

    async fn add(server: &TestServer, auth: &HeaderValue, category: &str, amount: &str, date: &str, description: Option<&str>) -> Value {
        let response = server
            .post("/api/expenses/add/")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({ "category": category, "amount": amount, "date": date, "description": description }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    async fn get(server: &TestServer, auth: &HeaderValue, path: &str) -> Value {
        let response = server.get(path).add_header(AUTHORIZATION, auth.clone()).await;
        response.assert_status_ok();
        response.json()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_aggregates_are_zero(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        assert_eq!(get(&server, &auth, "/api/expenses/summary/month/").await, json!({ "monthly_expense": "0.00" }));
        assert_eq!(
            get(&server, &auth, "/api/expenses/yearly-summary/2024/").await,
            json!({ "year": 2024, "yearly_expense": "0.00" })
        );
        assert_eq!(
            get(&server, &auth, "/api/expenses/total/").await,
            json!({ "category": null, "total_expenses": "0.00" })
        );
        assert_eq!(
            get(&server, &auth, "/api/expenses/category-breakdown/").await,
            json!({ "total_categories": 0, "breakdown": [] })
        );
        let daily = get(&server, &auth, "/api/expenses/daily-summary/?date=2024-03-01").await;
        assert_eq!(daily, json!({ "date": "2024-03-01", "total_spent": "0.00", "expenses": [] }));
        let monthly = get(&server, &auth, "/api/expenses/monthly/").await;
        assert_eq!(monthly["total_expenses"], "0.00");
        assert_eq!(monthly["category_expenses"], json!([]));

        let response = server.get("/api/expenses/highest/").add_header(AUTHORIZATION, auth).await;
        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "No expenses found for this user" }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_summaries_over_fixed_dates(pool: PgPool) {
        let (_alice, auth) = create_authenticated_user(&pool, "alice").await;
        let (_bob, bob_auth) = create_authenticated_user(&pool, "bob").await;
        let server = create_test_app(pool).await;

        add(&server, &auth, "Food", "12.50", "2024-03-01", Some("lunch")).await;
        add(&server, &auth, "Food", "7.50", "2024-03-03", None).await;
        let big = add(&server, &auth, "Health", "40", "2024-03-01", Some("dentist")).await;
        add(&server, &auth, "Transport", "3", "2023-12-31", None).await;
        add(&server, &bob_auth, "Food", "999", "2024-03-01", None).await;

        assert_eq!(get(&server, &auth, "/api/expenses/yearly-summary/2024/").await["yearly_expense"], "60.00");
        assert_eq!(get(&server, &auth, "/api/expenses/yearly-summary/2023/").await["yearly_expense"], "3.00");

        let daily = get(&server, &auth, "/api/expenses/daily-summary/?date=%202024-03-01%20").await;
        assert_eq!(daily["total_spent"], "52.50");
        assert_eq!(
            daily["expenses"],
            json!([
                { "date": "2024-03-01", "category": "Food", "amount": "12.50", "description": "lunch" },
                { "date": "2024-03-01", "category": "Health", "amount": "40.00", "description": "dentist" }
            ])
        );

        let by_date = get(&server, &auth, "/api/expenses/summary-by-date/?date=2024-03-03").await;
        assert_eq!(by_date["total_expense"], "7.50");
        assert_eq!(by_date["expenses"][0]["category"], "Food");
        assert!(by_date["expenses"][0].get("date").is_none());

        let range = get(&server, &auth, "/api/expenses/search/?start_date=2024-01-01&end_date=2024-03-01").await;
        assert_eq!(range["total_spent"], "52.50");
        assert_eq!(range["expenses"].as_array().unwrap().len(), 2);

        let breakdown = get(&server, &auth, "/api/expenses/category-breakdown/").await;
        assert_eq!(
            breakdown,
            json!({
                "total_categories": 3,
                "breakdown": [
                    { "category": "Health", "total_amount": "40.00" },
                    { "category": "Food", "total_amount": "20.00" },
                    { "category": "Transport", "total_amount": "3.00" }
                ]
            })
        );

        let highest = get(&server, &auth, "/api/expenses/highest/").await;
        assert_eq!(highest["id"], big["id"]);
        assert_eq!(highest["amount"], "40.00");

        assert_eq!(
            get(&server, &auth, "/api/expenses/total/?category=food").await,
            json!({ "category": "Food", "total_expenses": "20.00" })
        );
        assert_eq!(get(&server, &auth, "/api/expenses/total/").await["total_expenses"], "63.00");

        let history = get(&server, &auth, "/api/expenses/history/?category=Food").await;
        assert_eq!(history["total_expenses"], "20.00");
        let dates: Vec<&str> = history["history"].as_array().unwrap().iter().map(|h| h["date"].as_str().unwrap()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-03-03"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_current_month_views(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let now = today();
        let first = now.with_day(1).unwrap();
        let last_month = first.checked_sub_days(Days::new(1)).unwrap();
        add(&server, &auth, "Food", "10", &first.to_string(), None).await;
        add(&server, &auth, "Food", "5.25", &now.to_string(), None).await;
        add(&server, &auth, "School", "30", &now.to_string(), None).await;
        add(&server, &auth, "Food", "100", &last_month.to_string(), None).await;

        assert_eq!(get(&server, &auth, "/api/expenses/summary/month/").await["monthly_expense"], "45.25");

        let current = get(&server, &auth, "/api/expenses/category-current-month/?category=FOOD").await;
        assert_eq!(
            current,
            json!({
                "category": "Food",
                "month": now.format("%B").to_string(),
                "year": now.year(),
                "total_expense": "15.25"
            })
        );

        let expected = json!({
            "month": now.format("%B %Y").to_string(),
            "category_expenses": [
                { "category": "School", "total_spent": "30.00" },
                { "category": "Food", "total_spent": "15.25" }
            ],
            "total_expenses": "45.25"
        });
        assert_eq!(get(&server, &auth, "/api/expenses/monthly/").await, expected);
        assert_eq!(get(&server, &auth, "/api/expenses/monthly-category/?category=Food").await, expected);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_query_validation(pool: PgPool) {
        let (_user, auth) = create_authenticated_user(&pool, "alice").await;
        let server = create_test_app(pool).await;

        let cases = [
            ("/api/expenses/daily-summary/", "Date parameter is required"),
            ("/api/expenses/daily-summary/?date=03-01-2024", "Invalid date format, use YYYY-MM-DD"),
            ("/api/expenses/summary-by-date/?date=2024-02-30", "Invalid date format, use YYYY-MM-DD"),
            ("/api/expenses/search/?start_date=2024-01-01", "Both start_date and end_date are required"),
            ("/api/expenses/search/?start_date=2024-01-01&end_date=2024/02/01", "Invalid date format, use YYYY-MM-DD"),
            ("/api/expenses/search/?start_date=2024-03-01&end_date=2024-02-01", "start_date cannot be after end_date"),
            ("/api/expenses/history/", "Category parameter is required"),
            ("/api/expenses/category-current-month/?category=", "Category parameter is required"),
            ("/api/expenses/yearly-summary/-5000/", "Year -5000 is out of range"),
            ("/api/expenses/yearly-summary/10000/", "Year 10000 is out of range"),
        ];
        for (path, message) in cases {
            let response = server.get(path).add_header(AUTHORIZATION, auth.clone()).await;
            response.assert_status_bad_request();
            response.assert_json(&json!({ "error": message }));
        }

        let response = server.get("/api/expenses/total/?category=Rent").add_header(AUTHORIZATION, auth.clone()).await;
        response.assert_status_bad_request();

        let response = server.get("/api/expenses/yearly-summary/twenty/").add_header(AUTHORIZATION, auth).await;
        response.assert_status_bad_request();
    }
}
