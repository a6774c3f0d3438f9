//! SurrealDB repository implementations.

mod order;
mod package;
mod task;
mod user;

pub use order::SurrealOrderRepository;
pub use package::SurrealPackageRepository;
pub use task::SurrealTaskRepository;
pub use user::SurrealUserRepository;
