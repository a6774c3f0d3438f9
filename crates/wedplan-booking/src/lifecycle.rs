//! Order lifecycle: booking, payment proof, approval and closing.
//!
//! Every status change goes through [`OrderState::apply`] and is then
//! written with a compare-and-set on the state it was computed from, so
//! two requests racing on the same order cannot both succeed.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;
use wedplan_core::error::{ConflictKind, WedplanError, WedplanResult};
use wedplan_core::models::order::{
    AdminOrderView, CreateOrder, FinancialSummary, Order, OrderDetails, OrderEvent, OrderStatus,
    PaymentProof,
};
use wedplan_core::models::package::Package;
use wedplan_core::models::task::PreparationTask;
use wedplan_core::models::user::User;
use wedplan_core::repository::{
    OrderRepository, PackageRepository, TaskRepository, UserRepository,
};

use crate::provisioning::TaskProvisioner;

pub struct OrderLifecycle<O, P, U, T>
where
    O: OrderRepository,
    P: PackageRepository,
    U: UserRepository,
    T: TaskRepository,
{
    orders: O,
    packages: P,
    users: U,
    provisioner: TaskProvisioner<T>,
}

impl<O, P, U, T> OrderLifecycle<O, P, U, T>
where
    O: OrderRepository,
    P: PackageRepository,
    U: UserRepository,
    T: TaskRepository,
{
    pub fn new(orders: O, packages: P, users: U, tasks: T) -> Self {
        Self {
            orders,
            packages,
            users,
            provisioner: TaskProvisioner::new(tasks),
        }
    }

    pub fn provisioner(&self) -> &TaskProvisioner<T> {
        &self.provisioner
    }

    /// Book a wedding for a client.
    ///
    /// Checks run in a fixed order: input, the client's active order,
    /// the date, then the package. The store re-checks the first two
    /// atomically on insert.
    pub async fn create_order(&self, input: CreateOrder) -> WedplanResult<OrderDetails> {
        if input.total_price <= 0 {
            return Err(WedplanError::validation("total_price must be positive"));
        }

        let latest = self.orders.latest_for_user(input.user_id).await?;
        if latest.is_some_and(|order| !order.order_status.is_terminal()) {
            return Err(ConflictKind::ActiveOrderExists.into());
        }
        if self
            .orders
            .booked_dates()
            .await?
            .contains(&input.wedding_date)
        {
            return Err(ConflictKind::DateUnavailable.into());
        }

        let package = self.packages.get_by_id(input.package_id).await?;
        if !package.is_active {
            return Err(WedplanError::not_found("package", package.id));
        }

        let order = self.orders.create(input).await?;
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            wedding_date = %order.wedding_date,
            "Order created"
        );

        Ok(OrderDetails {
            order,
            package_name: package.name,
            tasks: None,
        })
    }

    /// Record the client's transfer proof and move payment to awaiting
    /// confirmation. Another client's order is reported as not found.
    pub async fn submit_payment_proof(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        proof: PaymentProof,
    ) -> WedplanResult<OrderDetails> {
        if proof.paid_amount <= 0 {
            return Err(WedplanError::validation("paid amount must be positive"));
        }

        let order = self.orders.get_for_user(order_id, user_id).await?;
        let order = self
            .transition(&order, OrderEvent::SubmitPaymentProof, Some(proof))
            .await?;
        info!(%order_id, paid_amount = ?order.client_paid_amount, "Payment proof submitted");

        self.details(order, None).await
    }

    /// Approve an order's payment and provision its checklist.
    ///
    /// Approving an already confirmed order changes nothing but still
    /// provisions a missing checklist.
    pub async fn approve_payment(&self, order_id: Uuid) -> WedplanResult<Order> {
        let order = self.orders.get_by_id(order_id).await?;
        let order = self
            .transition(&order, OrderEvent::ApprovePayment, None)
            .await?;
        info!(%order_id, state = %order.state(), "Payment approved");

        self.provisioner.ensure_default_tasks(order_id).await?;
        Ok(order)
    }

    /// Move an order to `Done` or `Cancelled`, releasing its date and
    /// the client's active-order slot.
    pub async fn close_order(&self, order_id: Uuid, status: OrderStatus) -> WedplanResult<Order> {
        let event = match status {
            OrderStatus::Done => OrderEvent::Complete,
            OrderStatus::Cancelled => OrderEvent::Cancel,
            other => {
                return Err(WedplanError::validation(format!(
                    "{} is not a closing status",
                    other.as_str()
                )));
            }
        };

        let order = self.orders.get_by_id(order_id).await?;
        let order = self.transition(&order, event, None).await?;
        info!(%order_id, status = order.order_status.as_str(), "Order closed");
        Ok(order)
    }

    pub async fn list_booked_dates(&self) -> WedplanResult<Vec<NaiveDate>> {
        self.orders.booked_dates().await
    }

    pub async fn financial_summary(&self) -> WedplanResult<FinancialSummary> {
        self.orders.financial_summary().await
    }

    /// The client's most recent order with its checklist, if any.
    pub async fn current_order_for_client(
        &self,
        user_id: Uuid,
    ) -> WedplanResult<Option<OrderDetails>> {
        let Some(order) = self.orders.latest_for_user(user_id).await? else {
            return Ok(None);
        };
        let tasks = self.provisioner.tasks_of(order.id).await?;
        self.details(order, Some(tasks)).await.map(Some)
    }

    /// Every order, newest first, with client and package names.
    pub async fn list_all_orders(&self) -> WedplanResult<Vec<AdminOrderView>> {
        let orders = self.orders.list_all().await?;
        let mut users: HashMap<Uuid, User> = HashMap::new();
        let mut packages: HashMap<Uuid, Package> = HashMap::new();

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            if !users.contains_key(&order.user_id) {
                let user = self.users.get_by_id(order.user_id).await?;
                users.insert(user.id, user);
            }
            if !packages.contains_key(&order.package_id) {
                let package = self.packages.get_by_id(order.package_id).await?;
                packages.insert(package.id, package);
            }

            let user = &users[&order.user_id];
            let package = &packages[&order.package_id];
            views.push(AdminOrderView {
                client_name: user.name.clone(),
                client_email: user.email.clone(),
                package_name: package.name.clone(),
                order,
            });
        }
        Ok(views)
    }

    /// Tasks of an existing order in checklist order.
    pub async fn list_tasks_for_order(
        &self,
        order_id: Uuid,
    ) -> WedplanResult<Vec<PreparationTask>> {
        self.orders.get_by_id(order_id).await?;
        self.provisioner.tasks_of(order_id).await
    }

    pub async fn toggle_task(&self, task_id: Uuid, is_done: bool) -> WedplanResult<PreparationTask> {
        self.provisioner.toggle_task(task_id, is_done).await
    }

    async fn transition(
        &self,
        order: &Order,
        event: OrderEvent,
        proof: Option<PaymentProof>,
    ) -> WedplanResult<Order> {
        let current = order.state();
        let next = current.apply(event)?;

        if next == current && proof.is_none() {
            debug!(order_id = %order.id, %event, "Transition is a no-op");
            return Ok(order.clone());
        }

        self.orders
            .apply_transition(order.id, current, next, proof)
            .await
    }

    async fn details(
        &self,
        order: Order,
        tasks: Option<Vec<PreparationTask>>,
    ) -> WedplanResult<OrderDetails> {
        let package = self.packages.get_by_id(order.package_id).await?;
        Ok(OrderDetails {
            order,
            package_name: package.name,
            tasks,
        })
    }
}
