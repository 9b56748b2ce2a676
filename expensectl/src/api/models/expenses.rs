use crate::api::models::category::Category;
use crate::db::models::expenses::{ExpenseCreateDBRequest, ExpenseDBResponse};
use crate::errors::{Error, Result};
use crate::types::{ExpenseId, UserId};
use crate::validation::{FieldValidator, parse_amount, parse_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/expenses/add/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExpenseCreate {
    /// One of Food, Transport, School, Entertainment, Health, Other (any casing)
    #[schema(example = "Food")]
    pub category: Option<String>,
    /// Number or numeric string, at most two decimal places
    #[schema(value_type = String, example = "12.50")]
    pub amount: Option<serde_json::Value>,
    /// `YYYY-MM-DD`; defaults to today
    #[schema(example = "2024-03-01")]
    pub date: Option<String>,
    pub description: Option<String>,
}

impl ExpenseCreate {
    pub fn validate(self, today: NaiveDate) -> Result<ExpenseCreateDBRequest> {
        let mut v = FieldValidator::new();

        let category = v
            .require("category", self.category.as_ref())
            .and_then(|c| v.check("category", c.parse::<Category>()));
        let amount = v
            .require("amount", self.amount.as_ref().filter(|a| !a.is_null()))
            .and_then(|a| v.check("amount", parse_amount(a)));
        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => Some(today),
            Some(raw) => v.check("date", parse_date(raw)),
        };
        v.text("description", self.description.as_deref());

        v.finish()?;

        match (category, amount, date) {
            (Some(category), Some(amount), Some(date)) => Ok(ExpenseCreateDBRequest {
                category,
                amount,
                date,
                description: self.description,
            }),
            // finish() has already reported whichever field is missing
            _ => Err(Error::Internal {
                operation: "validate expense".to_string(),
            }),
        }
    }
}

/// An expense as returned by create and list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    /// Owner id
    #[schema(value_type = String, format = "uuid")]
    pub user: UserId,
    pub category: Category,
    #[schema(value_type = String, example = "12.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl From<ExpenseDBResponse> for ExpenseResponse {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            user: db.user_id,
            category: db.category,
            amount: db.amount,
            date: db.date,
            description: db.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedExpense {
    pub id: ExpenseId,
    pub category: Category,
    #[schema(value_type = String, example = "12.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl From<ExpenseDBResponse> for DeletedExpense {
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

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseDeleteResponse {
    pub message: String,
    pub deleted_expense: DeletedExpense,
}

/// Body of `PUT /api/expenses/{id}/description/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DescriptionUpdate {
    pub new_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatedExpense {
    pub id: ExpenseId,
    pub category: Category,
    #[schema(value_type = String, example = "12.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub old_description: Option<String>,
    pub new_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DescriptionUpdateResponse {
    pub message: String,
    pub updated_expense: UpdatedExpense,
}
