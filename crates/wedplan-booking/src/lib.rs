//! wedplan Booking: the order lifecycle and preparation-task
//! provisioning.
//!
//! Services are generic over the repository traits in `wedplan-core`
//! and hold no state of their own.

pub mod lifecycle;
pub mod provisioning;

pub use lifecycle::OrderLifecycle;
pub use provisioning::TaskProvisioner;
