//! SurrealDB implementation of [`OrderRepository`].
//!
//! The single-active-order and date-exclusivity invariants are held by
//! claim records whose record id is the claimed key:
//! `active_order_claim:<user_id>` and `wedding_date_claim:<YYYY-MM-DD>`.
//! Claims are created in the same transaction as the order and deleted
//! in the same transaction that moves the order into a terminal state,
//! so at any instant a claim exists exactly for each non-terminal order.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;
use wedplan_core::error::{ConflictKind, WedplanError, WedplanResult};
use wedplan_core::models::order::{
    CreateOrder, FinancialSummary, Order, OrderState, PaymentProof,
};
use wedplan_core::repository::OrderRepository;

use crate::error::DbError;
use crate::rows::{format_date, parse_date, parse_enum, parse_uuid};

#[derive(Debug, SurrealValue)]
struct OrderRow {
    record_id: String,
    user_id: String,
    package_id: String,
    wedding_date: String,
    total_price: i64,
    payment_status: String,
    order_status: String,
    payment_proof_url: Option<String>,
    client_paid_amount: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn try_into_order(self) -> Result<Order, DbError> {
        Ok(Order {
            id: parse_uuid("order", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            package_id: parse_uuid("package", &self.package_id)?,
            wedding_date: parse_date(&self.wedding_date)?,
            total_price: self.total_price,
            payment_status: parse_enum(&self.payment_status)?,
            order_status: parse_enum(&self.order_status)?,
            payment_proof_url: self.payment_proof_url,
            client_paid_amount: self.client_paid_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct DateRow {
    wedding_date: String,
}

#[derive(Debug, SurrealValue)]
struct SummaryRow {
    total_revenue: i64,
    total_paid_orders: u64,
}

const CREATE_ORDER_TX: &str = "\
BEGIN TRANSACTION;
IF record::exists(type::record('active_order_claim', $user_id)) {
    THROW 'active order exists';
};
IF record::exists(type::record('wedding_date_claim', $wedding_date)) {
    THROW 'wedding date unavailable';
};
CREATE type::record('active_order_claim', $user_id) SET order_id = $id;
CREATE type::record('wedding_date_claim', $wedding_date) SET order_id = $id;
CREATE type::record('wedding_order', $id) SET \
    user_id = $user_id, \
    package_id = $package_id, \
    wedding_date = $wedding_date, \
    total_price = $total_price, \
    payment_status = $payment_status, \
    order_status = $order_status, \
    payment_proof_url = NONE, \
    client_paid_amount = NONE;
COMMIT TRANSACTION;
";

const RELEASE_CLAIMS: &str = "\
DELETE type::record('active_order_claim', $user_id) WHERE order_id = $id;
DELETE type::record('wedding_date_claim', $wedding_date) WHERE order_id = $id;
";

/// Build the compare-and-set transaction for a status transition.
fn transition_query(with_proof: bool, releases_claims: bool) -> String {
    let mut sets = vec![
        "order_status = $next_order_status",
        "payment_status = $next_payment_status",
    ];
    if with_proof {
        sets.push("payment_proof_url = $proof_url");
        sets.push("client_paid_amount = $paid_amount");
    }
    sets.push("updated_at = time::now()");

    format!(
        "BEGIN TRANSACTION;\n\
         LET $updated = (UPDATE type::record('wedding_order', $id) SET {} \
         WHERE order_status = $expected_order_status \
         AND payment_status = $expected_payment_status);\n\
         IF array::len($updated) = 0 {{ THROW 'stale order state'; }};\n\
         {}\
         COMMIT TRANSACTION;",
        sets.join(", "),
        if releases_claims { RELEASE_CLAIMS } else { "" },
    )
}

/// SurrealDB implementation of the Order repository.
#[derive(Clone)]
pub struct SurrealOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn claim_exists(&self, table: &str, key: String) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("RETURN record::exists(type::record($table, $key))")
            .bind(("table", table.to_string()))
            .bind(("key", key))
            .await?;
        let exists: Option<bool> = result.take(0)?;
        Ok(exists.unwrap_or(false))
    }

    /// Explain a failed create: whichever claim is held wins, checked in
    /// the same order as the transaction checks them.
    async fn classify_create_failure(
        &self,
        input: &CreateOrder,
        cause: String,
    ) -> WedplanError {
        let user_claimed = self
            .claim_exists("active_order_claim", input.user_id.to_string())
            .await;
        let date_claimed = self
            .claim_exists("wedding_date_claim", format_date(input.wedding_date))
            .await;

        match (user_claimed, date_claimed) {
            (Ok(true), _) => ConflictKind::ActiveOrderExists.into(),
            (Ok(false), Ok(true)) => ConflictKind::DateUnavailable.into(),
            (Err(e), _) | (_, Err(e)) => e.into(),
            (Ok(false), Ok(false)) => DbError::Query(cause).into(),
        }
    }
}

impl<C: Connection> OrderRepository for SurrealOrderRepository<C> {
    async fn create(&self, input: CreateOrder) -> WedplanResult<Order> {
        let id = Uuid::new_v4();
        let initial = OrderState::INITIAL;

        let response = self
            .db
            .query(CREATE_ORDER_TX)
            .bind(("id", id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("package_id", input.package_id.to_string()))
            .bind(("wedding_date", format_date(input.wedding_date)))
            .bind(("total_price", input.total_price))
            .bind(("payment_status", initial.payment_status.as_str().to_string()))
            .bind(("order_status", initial.order_status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = response.check() {
            debug!(order_id = %id, error = %e, "Order creation rejected");
            return Err(self.classify_create_failure(&input, e.to_string()).await);
        }

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> WedplanResult<Order> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('wedding_order', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "order".into(),
            id: id_str,
        })?;

        Ok(row.try_into_order()?)
    }

    async fn get_for_user(&self, id: Uuid, user_id: Uuid) -> WedplanResult<Order> {
        let order = self.get_by_id(id).await?;
        // Another client's order is reported exactly like a missing one.
        if order.user_id != user_id {
            return Err(WedplanError::not_found("order", id));
        }
        Ok(order)
    }

    async fn latest_for_user(&self, user_id: Uuid) -> WedplanResult<Option<Order>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM wedding_order \
                 WHERE user_id = $user_id \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(OrderRow::try_into_order)
            .transpose()?)
    }

    async fn list_all(&self) -> WedplanResult<Vec<Order>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM wedding_order \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let orders = rows
            .into_iter()
            .map(OrderRow::try_into_order)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(orders)
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        expected: OrderState,
        next: OrderState,
        proof: Option<PaymentProof>,
    ) -> WedplanResult<Order> {
        let current = self.get_by_id(id).await?;
        let releases_claims =
            next.order_status.is_terminal() && !expected.order_status.is_terminal();
        let query = transition_query(proof.is_some(), releases_claims);

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("user_id", current.user_id.to_string()))
            .bind(("wedding_date", format_date(current.wedding_date)))
            .bind((
                "expected_order_status",
                expected.order_status.as_str().to_string(),
            ))
            .bind((
                "expected_payment_status",
                expected.payment_status.as_str().to_string(),
            ))
            .bind(("next_order_status", next.order_status.as_str().to_string()))
            .bind((
                "next_payment_status",
                next.payment_status.as_str().to_string(),
            ));

        if let Some(proof) = proof {
            builder = builder
                .bind(("proof_url", proof.proof_url))
                .bind(("paid_amount", proof.paid_amount));
        }

        let response = builder.await.map_err(DbError::from)?;
        if let Err(e) = response.check() {
            // Either the order vanished or someone else moved it first.
            let latest = self.get_by_id(id).await?;
            debug!(order_id = %id, error = %e, state = %latest.state(), "Order transition lost");
            return Err(ConflictKind::InvalidTransition {
                from: latest.state().to_string(),
                event: format!("move to {next}"),
            }
            .into());
        }

        self.get_by_id(id).await
    }

    async fn booked_dates(&self) -> WedplanResult<Vec<NaiveDate>> {
        let mut result = self
            .db
            .query(
                "SELECT wedding_date FROM wedding_order \
                 WHERE order_status NOTINSIDE ['Cancelled', 'Done']",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DateRow> = result.take(0).map_err(DbError::from)?;
        let dates = rows
            .iter()
            .map(|row| parse_date(&row.wedding_date))
            .collect::<Result<BTreeSet<_>, DbError>>()?;
        Ok(dates.into_iter().collect())
    }

    async fn financial_summary(&self) -> WedplanResult<FinancialSummary> {
        let mut result = self
            .db
            .query(
                "SELECT math::sum(total_price) AS total_revenue, \
                 count() AS total_paid_orders FROM wedding_order \
                 WHERE payment_status = 'Paid' GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SummaryRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .first()
            .map(|row| FinancialSummary {
                total_revenue: row.total_revenue,
                total_paid_orders: row.total_paid_orders,
            })
            .unwrap_or_default())
    }
}
