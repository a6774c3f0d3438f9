//! Shared state for HTTP handlers.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use wedplan_auth::{AuthConfig, AuthService};
use wedplan_booking::OrderLifecycle;
use wedplan_db::repository::{
    SurrealOrderRepository, SurrealPackageRepository, SurrealTaskRepository,
    SurrealUserRepository,
};

use crate::upload::{ProofStorage, UploadConfig};

pub type Auth = AuthService<SurrealUserRepository<Any>>;

pub type Booking = OrderLifecycle<
    SurrealOrderRepository<Any>,
    SurrealPackageRepository<Any>,
    SurrealUserRepository<Any>,
    SurrealTaskRepository<Any>,
>;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub booking: Arc<Booking>,
    pub packages: SurrealPackageRepository<Any>,
    pub proofs: Arc<ProofStorage>,
}

impl AppState {
    /// Wire repositories and services over one database handle.
    ///
    /// The same pepper is used for hashing at registration and for
    /// verification at login.
    pub fn new(db: Surreal<Any>, auth: AuthConfig, upload: UploadConfig) -> Self {
        let users = SurrealUserRepository::with_pepper(db.clone(), auth.pepper.clone());
        let packages = SurrealPackageRepository::new(db.clone());

        let booking = OrderLifecycle::new(
            SurrealOrderRepository::new(db.clone()),
            packages.clone(),
            users.clone(),
            SurrealTaskRepository::new(db),
        );

        Self {
            auth: Arc::new(AuthService::new(users, auth)),
            booking: Arc::new(booking),
            packages,
            proofs: Arc::new(ProofStorage::new(upload)),
        }
    }
}
