//! OpenAPI documentation for the `/api` surface, served at `/docs` (Scalar UI) and
//! `/docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// `Authorization: Token <key>` header scheme.
struct TokenSecurityAddon;

impl Modify for TokenSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token returned by register or login. Send it as:\n\n\
                     ```\nAuthorization: Token YOUR_TOKEN\n```",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "expensectl API", description = "Personal expense and monthly budget tracking."),
    modifiers(&TokenSecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::secure,
        api::handlers::expenses::add_expense,
        api::handlers::expenses::list_by_category,
        api::handlers::expenses::delete_expense,
        api::handlers::expenses::update_description,
        api::handlers::summaries::monthly_expense,
        api::handlers::summaries::yearly_summary,
        api::handlers::summaries::daily_summary,
        api::handlers::summaries::search,
        api::handlers::summaries::category_breakdown,
        api::handlers::summaries::highest,
        api::handlers::summaries::total,
        api::handlers::summaries::category_current_month,
        api::handlers::summaries::history,
        api::handlers::summaries::summary_by_date,
        api::handlers::summaries::monthly_category,
        api::handlers::budgets::set_budget,
        api::handlers::budgets::get_budget,
        api::handlers::budgets::budget_status,
        api::handlers::budgets::total_budget,
        api::handlers::budgets::delete_budget,
    ),
    components(
        schemas(
            api::models::category::Category,
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::TokenResponse,
            api::models::auth::MessageResponse,
            api::models::expenses::ExpenseCreate,
            api::models::expenses::ExpenseResponse,
            api::models::expenses::DeletedExpense,
            api::models::expenses::ExpenseDeleteResponse,
            api::models::expenses::DescriptionUpdate,
            api::models::expenses::UpdatedExpense,
            api::models::expenses::DescriptionUpdateResponse,
            api::models::summaries::MonthlyExpenseResponse,
            api::models::summaries::YearlyExpenseResponse,
            api::models::summaries::DailyExpenseItem,
            api::models::summaries::DailySummaryResponse,
            api::models::summaries::DateRangeSummaryResponse,
            api::models::summaries::CategoryAmount,
            api::models::summaries::CategoryBreakdownResponse,
            api::models::summaries::TotalExpensesResponse,
            api::models::summaries::CategoryMonthTotalResponse,
            api::models::summaries::HistoryItem,
            api::models::summaries::CategoryHistoryResponse,
            api::models::summaries::DateSummaryItem,
            api::models::summaries::DateSummaryResponse,
            api::models::summaries::CategorySpend,
            api::models::summaries::MonthlyCategoryResponse,
            api::models::summaries::HighestExpenseResponse,
            api::models::budgets::BudgetSet,
            api::models::budgets::BudgetSetResponse,
            api::models::budgets::BudgetResponse,
            api::models::budgets::BudgetState,
            api::models::budgets::BudgetStatusResponse,
            api::models::budgets::BudgetTotalResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Register, log in and check a token."),
        (name = "expenses", description = "Record, list, delete and annotate expenses."),
        (name = "summaries", description = "Totals and itemized views over the caller's expenses."),
        (name = "budgets", description = "One budget per category per calendar month."),
    )
)]
pub struct ApiDoc;
