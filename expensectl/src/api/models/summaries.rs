//! Query parameters and response bodies for the expense summary endpoints.
//!
//! Query parameters are kept as raw strings so missing and malformed values can be
//! reported with the API's own messages instead of the extractor's.

use crate::api::models::category::Category;
use crate::db::models::expenses::{CategoryTotal, ExpenseDBResponse};
use crate::types::ExpenseId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Expense category, case-insensitive
    #[param(example = "Food")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// `YYYY-MM-DD`
    #[param(example = "2024-03-01")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyExpenseResponse {
    #[schema(value_type = String, example = "120.00")]
    pub monthly_expense: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YearlyExpenseResponse {
    pub year: i32,
    #[schema(value_type = String, example = "1520.00")]
    pub yearly_expense: Decimal,
}

/// Line of a daily summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyExpenseItem {
    pub date: NaiveDate,
    pub category: Category,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub description: Option<String>,
}

impl From<ExpenseDBResponse> for DailyExpenseItem {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            date: db.date,
            category: db.category,
            amount: db.amount,
            description: db.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
    pub expenses: Vec<DailyExpenseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DateRangeSummaryResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
    pub expenses: Vec<DailyExpenseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryAmount {
    pub category: Category,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

impl From<CategoryTotal> for CategoryAmount {
    fn from(total: CategoryTotal) -> Self {
        Self {
            category: total.category,
            total_amount: total.total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryBreakdownResponse {
    pub total_categories: usize,
    pub breakdown: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TotalExpensesResponse {
    /// Null when the total covers every category
    pub category: Option<Category>,
    #[schema(value_type = String)]
    pub total_expenses: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryMonthTotalResponse {
    pub category: Category,
    /// Month name, e.g. "March"
    pub month: String,
    pub year: i32,
    #[schema(value_type = String)]
    pub total_expense: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryItem {
    pub id: ExpenseId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl From<ExpenseDBResponse> for HistoryItem {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            amount: db.amount,
            category: db.category,
            description: db.description,
            date: db.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryHistoryResponse {
    pub category: Category,
    #[schema(value_type = String)]
    pub total_expenses: Decimal,
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DateSummaryItem {
    pub id: ExpenseId,
    pub category: Category,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub description: Option<String>,
}

impl From<ExpenseDBResponse> for DateSummaryItem {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            category: db.category,
            amount: db.amount,
            description: db.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DateSummaryResponse {
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub total_expense: Decimal,
    pub expenses: Vec<DateSummaryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySpend {
    pub category: Category,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
}

impl From<CategoryTotal> for CategorySpend {
    fn from(total: CategoryTotal) -> Self {
        Self {
            category: total.category,
            total_spent: total.total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyCategoryResponse {
    /// e.g. "March 2024"
    pub month: String,
    pub category_expenses: Vec<CategorySpend>,
    #[schema(value_type = String)]
    pub total_expenses: Decimal,
}

/// The single largest expense.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HighestExpenseResponse {
    pub id: ExpenseId,
    pub category: Category,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl From<ExpenseDBResponse> for HighestExpenseResponse {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            category: db.category,
            amount: db.amount,
            date: db.date,
            description: db.description,
        }
    }
}
