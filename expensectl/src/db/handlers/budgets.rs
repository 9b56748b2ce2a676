//! Database repository for monthly budgets.
//!
//! A user holds at most one budget per category per calendar month. The month key is the
//! generated `period` column, so writes only ever supply `date`.

use crate::api::models::category::Category;
use crate::db::{
    errors::Result,
    models::budgets::{BudgetDBResponse, BudgetUpsertDBRequest},
};
use crate::types::{BudgetId, UserId, abbrev_uuid, money};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

const COLUMNS: &str = "id, user_id, category, amount, date, period, description, created_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Budget {
    id: BudgetId,
    user_id: UserId,
    category: Category,
    amount: Decimal,
    date: NaiveDate,
    period: NaiveDate,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<Budget> for BudgetDBResponse {
    fn from(budget: Budget) -> Self {
        Self {
            id: budget.id,
            user_id: budget.user_id,
            category: budget.category,
            amount: money(budget.amount),
            date: budget.date,
            period: budget.period,
            description: budget.description,
            created_at: budget.created_at,
        }
    }
}

pub struct Budgets<'c> {
    db: &'c mut PgConnection,
    owner: UserId,
}

impl<'c> Budgets<'c> {
    pub fn new(db: &'c mut PgConnection, owner: UserId) -> Self {
        Self { db, owner }
    }

    /// Create the budget for `(category, month of request.date)`, or overwrite its amount and
    /// date if one already exists.
    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&self.owner), category = %request.category), err)]
    pub async fn upsert(&mut self, request: &BudgetUpsertDBRequest) -> Result<BudgetDBResponse> {
        let mut tx = self.db.begin().await?;

        let query = format!(
            "INSERT INTO budgets (user_id, category, amount, date) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, category, period) \
             DO UPDATE SET amount = EXCLUDED.amount, date = EXCLUDED.date \
             RETURNING {COLUMNS}"
        );
        let budget = sqlx::query_as::<_, Budget>(&query)
            .bind(self.owner)
            .bind(request.category)
            .bind(request.amount)
            .bind(request.date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(budget.into())
    }

    /// The most recently dated budget for a category, in any month.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn latest(&mut self, category: Category) -> Result<Option<BudgetDBResponse>> {
        let query = format!("SELECT {COLUMNS} FROM budgets WHERE user_id = $1 AND category = $2 ORDER BY date DESC, id DESC LIMIT 1");
        let budget = sqlx::query_as::<_, Budget>(&query)
            .bind(self.owner)
            .bind(category)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(budget.map(Into::into))
    }

    /// Sum of every budget the owner has ever set; zero when there are none.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn total(&mut self) -> Result<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM budgets WHERE user_id = $1")
            .bind(self.owner)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(money(total))
    }

    /// Delete the budget for a category in the month starting at `period`.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&self.owner)), err)]
    pub async fn delete_for_period(&mut self, category: Category, period: NaiveDate) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE user_id = $1 AND category = $2 AND period = $3")
            .bind(self.owner)
            .bind(category)
            .bind(period)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_user, date, money};
    use sqlx::PgPool;

    fn budget(category: Category, amount: &str, on: &str) -> BudgetUpsertDBRequest {
        BudgetUpsertDBRequest {
            category,
            amount: money(amount),
            date: date(on),
        }
    }

    async fn count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM budgets").fetch_one(pool).await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_same_month_updates(pool: PgPool) {
        let user = create_test_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Budgets::new(&mut conn, user.id);

        let first = repo.upsert(&budget(Category::Food, "200", "2024-03-02")).await.unwrap();
        let second = repo.upsert(&budget(Category::Food, "150", "2024-03-20")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.amount, money("150"));
        assert_eq!(second.period, date("2024-03-01"));
        drop(repo);
        assert_eq!(count(&pool).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_is_per_month_category_and_user(pool: PgPool) {
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let mut conn = pool.acquire().await.unwrap();

        let mut repo = Budgets::new(&mut conn, alice.id);
        repo.upsert(&budget(Category::Food, "200", "2024-03-02")).await.unwrap();
        repo.upsert(&budget(Category::Food, "210", "2024-04-02")).await.unwrap();
        repo.upsert(&budget(Category::Health, "50", "2024-03-02")).await.unwrap();

        let mut bobs = Budgets::new(&mut conn, bob.id);
        bobs.upsert(&budget(Category::Food, "999", "2024-03-02")).await.unwrap();

        assert_eq!(count(&pool).await, 4);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_latest_and_total(pool: PgPool) {
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let mut conn = pool.acquire().await.unwrap();

        let mut bobs = Budgets::new(&mut conn, bob.id);
        bobs.upsert(&budget(Category::Food, "999", "2024-05-01")).await.unwrap();

        let mut repo = Budgets::new(&mut conn, alice.id);
        assert!(repo.latest(Category::Food).await.unwrap().is_none());
        assert_eq!(repo.total().await.unwrap().to_string(), "0.00");

        repo.upsert(&budget(Category::Food, "100", "2024-03-02")).await.unwrap();
        repo.upsert(&budget(Category::Food, "120", "2024-04-02")).await.unwrap();
        repo.upsert(&budget(Category::School, "30.50", "2024-04-02")).await.unwrap();

        let latest = repo.latest(Category::Food).await.unwrap().unwrap();
        assert_eq!(latest.amount, money("120"));
        assert_eq!(latest.date, date("2024-04-02"));

        assert_eq!(repo.total().await.unwrap(), money("250.50"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_for_period_only_touches_that_month(pool: PgPool) {
        let user = create_test_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Budgets::new(&mut conn, user.id);

        repo.upsert(&budget(Category::Food, "100", "2024-03-02")).await.unwrap();
        repo.upsert(&budget(Category::Food, "120", "2024-04-02")).await.unwrap();

        assert!(repo.delete_for_period(Category::Food, date("2024-04-01")).await.unwrap());
        assert!(!repo.delete_for_period(Category::Food, date("2024-04-01")).await.unwrap());
        assert!(!repo.delete_for_period(Category::Health, date("2024-03-01")).await.unwrap());

        let remaining = repo.latest(Category::Food).await.unwrap().unwrap();
        assert_eq!(remaining.period, date("2024-03-01"));
    }
}
