//! wedplan core: domain models, the error taxonomy and the repository
//! traits shared by every other crate in the workspace.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ConflictKind, WedplanError, WedplanResult};
