use crate::api::models::category::Category;
use crate::types::{ExpenseId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Validated input for inserting an expense. The owner comes from the repository.
#[derive(Debug, Clone)]
pub struct ExpenseCreateDBRequest {
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Only the description of an expense is mutable.
#[derive(Debug, Clone)]
pub struct ExpenseUpdateDBRequest {
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDBResponse {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub category: Category,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sum of a user's expenses in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}
