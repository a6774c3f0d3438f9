//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations translate store
//! failures into [`WedplanError::Database`](crate::error::WedplanError)
//! and missing rows into `NotFound`.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::WedplanResult;
use crate::models::{
    order::{CreateOrder, FinancialSummary, Order, OrderState, PaymentProof},
    package::{CreatePackage, Package},
    task::PreparationTask,
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict(EmailTaken)` when the email is registered.
    fn create(&self, input: CreateUser) -> impl Future<Output = WedplanResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WedplanResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = WedplanResult<User>> + Send;
}

pub trait PackageRepository: Send + Sync {
    fn create(&self, input: CreatePackage) -> impl Future<Output = WedplanResult<Package>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WedplanResult<Package>> + Send;
    /// Packages open for booking, cheapest first.
    fn list_active(&self) -> impl Future<Output = WedplanResult<Vec<Package>>> + Send;
    fn list_all(&self) -> impl Future<Output = WedplanResult<Vec<Package>>> + Send;
}

pub trait OrderRepository: Send + Sync {
    /// Insert a new order in its initial state.
    ///
    /// The client's active-order slot and the wedding date are claimed in
    /// the same transaction; fails with `Conflict(ActiveOrderExists)` or
    /// `Conflict(DateUnavailable)` when either is already held.
    fn create(&self, input: CreateOrder) -> impl Future<Output = WedplanResult<Order>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WedplanResult<Order>> + Send;

    /// Fetch an order only if it belongs to `user_id`.
    fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = WedplanResult<Order>> + Send;

    /// The most recently created order of a user, if any.
    fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = WedplanResult<Option<Order>>> + Send;

    /// Every order, newest first.
    fn list_all(&self) -> impl Future<Output = WedplanResult<Vec<Order>>> + Send;

    /// Move an order from `expected` to `next`, optionally recording a
    /// payment proof.
    ///
    /// Compare-and-set: fails with `Conflict(InvalidTransition)` if the
    /// stored state is no longer `expected`. Entering a terminal state
    /// releases the order's claims.
    fn apply_transition(
        &self,
        id: Uuid,
        expected: OrderState,
        next: OrderState,
        proof: Option<PaymentProof>,
    ) -> impl Future<Output = WedplanResult<Order>> + Send;

    /// Distinct wedding dates held by non-terminal orders, ascending.
    fn booked_dates(&self) -> impl Future<Output = WedplanResult<Vec<NaiveDate>>> + Send;

    fn financial_summary(&self) -> impl Future<Output = WedplanResult<FinancialSummary>> + Send;
}

pub trait TaskRepository: Send + Sync {
    /// Tasks of an order ordered by checklist position.
    fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> impl Future<Output = WedplanResult<Vec<PreparationTask>>> + Send;

    /// Insert the whole checklist in one transaction.
    ///
    /// Positions are unique per order, so a concurrent duplicate fails as
    /// a whole rather than adding rows.
    fn create_checklist(
        &self,
        order_id: Uuid,
        names: &[&str],
    ) -> impl Future<Output = WedplanResult<Vec<PreparationTask>>> + Send;

    fn set_done(
        &self,
        id: Uuid,
        is_done: bool,
    ) -> impl Future<Output = WedplanResult<PreparationTask>> + Send;
}
