use crate::api::models::category::Category;
use crate::types::{BudgetId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Create-or-replace a budget for the month containing `date`.
#[derive(Debug, Clone)]
pub struct BudgetUpsertDBRequest {
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDBResponse {
    pub id: BudgetId,
    pub user_id: UserId,
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// First day of the budget's month
    pub period: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
