//! Order domain model and its status transition table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConflictKind;
use crate::models::task::PreparationTask;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Unpaid,
    AwaitingConfirmation,
    Paid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Done,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::AwaitingConfirmation => "AwaitingConfirmation",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(PaymentStatus::Unpaid),
            "AwaitingConfirmation" => Ok(PaymentStatus::AwaitingConfirmation),
            "Paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Done => "Done",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal orders no longer hold the client's active slot or
    /// their wedding date.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Done" => Ok(OrderStatus::Done),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Events that move an order through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    SubmitPaymentProof,
    ApprovePayment,
    Complete,
    Cancel,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderEvent::SubmitPaymentProof => "submit payment proof for",
            OrderEvent::ApprovePayment => "approve payment of",
            OrderEvent::Complete => "complete",
            OrderEvent::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// The pair of statuses an order carries at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderState {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.order_status.as_str(),
            self.payment_status.as_str()
        )
    }
}

impl OrderState {
    pub const INITIAL: OrderState = OrderState {
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
    };

    /// Apply `event`, returning the next state or the conflict that
    /// rejects it. Every `(state, event)` pair is listed explicitly.
    pub fn apply(self, event: OrderEvent) -> Result<OrderState, ConflictKind> {
        use OrderStatus::*;
        use PaymentStatus::*;

        let next = match (self.order_status, self.payment_status, event) {
            (Pending, Unpaid | AwaitingConfirmation, OrderEvent::SubmitPaymentProof) => {
                Some((Pending, AwaitingConfirmation))
            }
            (Pending, Paid, OrderEvent::SubmitPaymentProof) => None,

            (Pending, Unpaid | AwaitingConfirmation, OrderEvent::ApprovePayment) => {
                Some((Confirmed, Paid))
            }
            (Pending, Paid, OrderEvent::ApprovePayment) => Some((Confirmed, Paid)),
            (Confirmed, Paid, OrderEvent::ApprovePayment) => Some((Confirmed, Paid)),

            (Pending | Confirmed, payment, OrderEvent::Cancel) => Some((Cancelled, payment)),
            (Confirmed, Paid, OrderEvent::Complete) => Some((Done, Paid)),

            (Confirmed, _, OrderEvent::SubmitPaymentProof) => None,
            (Confirmed, Unpaid | AwaitingConfirmation, OrderEvent::ApprovePayment) => None,
            (Confirmed, Unpaid | AwaitingConfirmation, OrderEvent::Complete) => None,
            (Pending, _, OrderEvent::Complete) => None,
            (Done | Cancelled, _, _) => None,
        };

        next.map(|(order_status, payment_status)| OrderState {
            order_status,
            payment_status,
        })
        .ok_or_else(|| ConflictKind::InvalidTransition {
            from: self.to_string(),
            event: event.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub wedding_date: NaiveDate,
    pub total_price: i64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub payment_proof_url: Option<String>,
    pub client_paid_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn state(&self) -> OrderState {
        OrderState {
            order_status: self.order_status,
            payment_status: self.payment_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub wedding_date: NaiveDate,
    pub total_price: i64,
}

/// Payment proof fields written when a client confirms a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub proof_url: String,
    pub paid_amount: i64,
}

/// An order joined with the name of its package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<PreparationTask>>,
}

/// An order as listed for administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    pub client_name: String,
    pub client_email: String,
    pub package_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: i64,
    pub total_paid_orders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(order_status: OrderStatus, payment_status: PaymentStatus) -> OrderState {
        OrderState {
            order_status,
            payment_status,
        }
    }

    #[test]
    fn happy_path_reaches_confirmed() {
        let submitted = OrderState::INITIAL
            .apply(OrderEvent::SubmitPaymentProof)
            .unwrap();
        assert_eq!(
            submitted,
            state(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation)
        );

        let approved = submitted.apply(OrderEvent::ApprovePayment).unwrap();
        assert_eq!(approved, state(OrderStatus::Confirmed, PaymentStatus::Paid));
    }

    #[test]
    fn reapproval_is_a_no_op() {
        let confirmed = state(OrderStatus::Confirmed, PaymentStatus::Paid);
        assert_eq!(confirmed.apply(OrderEvent::ApprovePayment), Ok(confirmed));
    }

    #[test]
    fn proof_cannot_be_resubmitted_after_confirmation() {
        let confirmed = state(OrderStatus::Confirmed, PaymentStatus::Paid);
        let err = confirmed.apply(OrderEvent::SubmitPaymentProof).unwrap_err();
        assert!(matches!(err, ConflictKind::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [OrderStatus::Done, OrderStatus::Cancelled] {
            for event in [
                OrderEvent::SubmitPaymentProof,
                OrderEvent::ApprovePayment,
                OrderEvent::Complete,
                OrderEvent::Cancel,
            ] {
                assert!(state(terminal, PaymentStatus::Paid).apply(event).is_err());
            }
        }
    }

    #[test]
    fn only_paid_confirmed_orders_complete() {
        assert!(
            OrderState::INITIAL.apply(OrderEvent::Complete).is_err(),
            "pending order cannot complete"
        );
        let done = state(OrderStatus::Confirmed, PaymentStatus::Paid)
            .apply(OrderEvent::Complete)
            .unwrap();
        assert_eq!(done.order_status, OrderStatus::Done);
    }

    #[test]
    fn cancel_keeps_payment_status() {
        let awaiting = state(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation);
        let cancelled = awaiting.apply(OrderEvent::Cancel).unwrap();
        assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::AwaitingConfirmation);
    }

    #[test]
    fn status_strings_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Done,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("Lunas".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn summary_uses_camel_case() {
        let json = serde_json::to_value(FinancialSummary {
            total_revenue: 150_000_000,
            total_paid_orders: 3,
        })
        .unwrap();
        assert_eq!(json["totalRevenue"], 150_000_000);
        assert_eq!(json["totalPaidOrders"], 3);
    }
}
