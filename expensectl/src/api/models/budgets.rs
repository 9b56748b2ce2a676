use crate::api::models::category::Category;
use crate::errors::{Error, Result};
use crate::validation::{FieldValidator, parse_amount};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/budget/set/`. The budget always applies to the current month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BudgetSet {
    #[schema(example = "Food")]
    pub category: Option<String>,
    #[schema(value_type = String, example = "200.00")]
    pub amount: Option<serde_json::Value>,
}

impl BudgetSet {
    pub fn validate(self) -> Result<(Category, Decimal)> {
        let mut v = FieldValidator::new();
        let category = v
            .require("category", self.category.as_ref())
            .and_then(|c| v.check("category", c.parse::<Category>()));
        let amount = v
            .require("amount", self.amount.as_ref().filter(|a| !a.is_null()))
            .and_then(|a| v.check("amount", parse_amount(a)));
        v.finish()?;

        category.zip(amount).ok_or_else(|| Error::Internal {
            operation: "validate budget".to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetSetResponse {
    pub message: String,
    pub category: Category,
    #[schema(value_type = String, example = "200.00")]
    pub amount: Decimal,
    /// Month name, e.g. "March"
    pub month: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub category: Category,
    #[schema(value_type = String, example = "200.00")]
    pub budget_amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BudgetState {
    #[serde(rename = "Under Budget")]
    UnderBudget,
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl BudgetState {
    /// Zero remaining still counts as under budget.
    pub fn for_remaining(remaining: Decimal) -> Self {
        if remaining.is_sign_negative() && !remaining.is_zero() {
            Self::OverBudget
        } else {
            Self::UnderBudget
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetStatusResponse {
    pub category: Category,
    #[schema(value_type = String)]
    pub budget_amount: Decimal,
    #[schema(value_type = String)]
    pub total_spent: Decimal,
    #[schema(value_type = String)]
    pub remaining_budget: Decimal,
    pub status: BudgetState,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetTotalResponse {
    #[schema(value_type = String, example = "450.00")]
    pub total_budget: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::money;
    use serde_json::json;

    #[test]
    fn test_budget_state() {
        assert_eq!(BudgetState::for_remaining(money("60.00")), BudgetState::UnderBudget);
        assert_eq!(BudgetState::for_remaining(money("0.00")), BudgetState::UnderBudget);
        assert_eq!(BudgetState::for_remaining(money("-0.01")), BudgetState::OverBudget);
        assert_eq!(serde_json::to_value(BudgetState::OverBudget).unwrap(), json!("Over Budget"));
    }

    #[test]
    fn test_validate_budget_set() {
        let body: BudgetSet = serde_json::from_value(json!({ "category": "FOOD", "amount": 200 })).unwrap();
        let (category, amount) = body.validate().unwrap();
        assert_eq!(category, Category::Food);
        assert_eq!(amount.to_string(), "200.00");

        let body: BudgetSet = serde_json::from_value(json!({ "amount": "-1" })).unwrap();
        let Err(Error::Validation { errors }) = body.validate() else {
            panic!("expected validation error")
        };
        assert_eq!(errors["category"], vec!["This field is required.".to_string()]);
        assert!(errors["amount"][0].contains("greater than or equal to 0"));
    }
}
