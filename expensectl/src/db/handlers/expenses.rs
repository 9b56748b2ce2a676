//! Database repository for expenses.
//!
//! Every query is scoped to the owner the repository was created for.

use crate::api::models::category::Category;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::expenses::{CategoryTotal, ExpenseCreateDBRequest, ExpenseDBResponse, ExpenseUpdateDBRequest},
};
use crate::types::{ExpenseId, UserId, abbrev_uuid, money};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const COLUMNS: &str = "id, user_id, category, amount, date, description, created_at";

// $1 is always the owner; $2..$4 are the optional filter values
const FILTER: &str = "user_id = $1 \
    AND ($2::expense_category IS NULL OR category = $2) \
    AND ($3::date IS NULL OR date >= $3) \
    AND ($4::date IS NULL OR date <= $4)";

/// Sort order for [`Expenses::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpenseOrder {
    /// Insertion order
    #[default]
    Id,
    /// Oldest first, ties in insertion order
    Date,
}

impl ExpenseOrder {
    fn sql(self) -> &'static str {
        match self {
            ExpenseOrder::Id => "id",
            ExpenseOrder::Date => "date, id",
        }
    }
}

/// Filter for listing and aggregating expenses. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub order: ExpenseOrder,
}

impl ExpenseFilter {
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn between(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    pub fn ordered_by(mut self, order: ExpenseOrder) -> Self {
        self.order = order;
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Expense {
    id: ExpenseId,
    user_id: UserId,
    category: Category,
    amount: Decimal,
    date: NaiveDate,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseDBResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            user_id: expense.user_id,
            category: expense.category,
            amount: money(expense.amount),
            date: expense.date,
            description: expense.description,
            created_at: expense.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CategoryTotalRow {
    category: Category,
    total: Decimal,
}

pub struct Expenses<'c> {
    db: &'c mut PgConnection,
    owner: UserId,
}

impl<'c> Expenses<'c> {
    pub fn new(db: &'c mut PgConnection, owner: UserId) -> Self {
        Self { db, owner }
    }

    /// Sum of matching amounts; zero when nothing matches.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn sum(&mut self, filter: &ExpenseFilter) -> Result<Decimal> {
        let query = format!("SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE {FILTER}");
        let total = sqlx::query_scalar::<_, Decimal>(&query)
            .bind(self.owner)
            .bind(filter.category)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(money(total))
    }

    /// Per-category sums of matching expenses, largest first. Categories with no expenses are omitted.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn category_totals(&mut self, filter: &ExpenseFilter) -> Result<Vec<CategoryTotal>> {
        let query = format!(
            "SELECT category, SUM(amount) AS total FROM expenses WHERE {FILTER} \
             GROUP BY category ORDER BY total DESC, category"
        );
        let rows = sqlx::query_as::<_, CategoryTotalRow>(&query)
            .bind(self.owner)
            .bind(filter.category)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryTotal {
                category: row.category,
                total: money(row.total),
            })
            .collect())
    }

    /// The single largest expense, earliest recorded on ties.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn highest(&mut self) -> Result<Option<ExpenseDBResponse>> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE user_id = $1 ORDER BY amount DESC, id LIMIT 1");
        let expense = sqlx::query_as::<_, Expense>(&query)
            .bind(self.owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(expense.map(Into::into))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Expenses<'c> {
    type CreateRequest = ExpenseCreateDBRequest;
    type UpdateRequest = ExpenseUpdateDBRequest;
    type Response = ExpenseDBResponse;
    type Id = ExpenseId;
    type Filter = ExpenseFilter;

    #[instrument(skip(self, request), fields(category = %request.category), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let query = format!(
            "INSERT INTO expenses (user_id, category, amount, date, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        let expense = sqlx::query_as::<_, Expense>(&query)
            .bind(self.owner)
            .bind(request.category)
            .bind(request.amount)
            .bind(request.date)
            .bind(&request.description)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(expense.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE id = $1 AND user_id = $2");
        let expense = sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(self.owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(expense.map(Into::into))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE {FILTER} ORDER BY {}", filter.order.sql());
        let expenses = sqlx::query_as::<_, Expense>(&query)
            .bind(self.owner)
            .bind(filter.category)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(expenses.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(self.owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let query = format!("UPDATE expenses SET description = $3 WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}");
        let expense = sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(self.owner)
            .bind(&request.description)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(expense.into())
    }
}
