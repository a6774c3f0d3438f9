//! Integration tests for checklist provisioning.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use wedplan_booking::TaskProvisioner;
use wedplan_core::error::WedplanError;
use wedplan_core::models::task::DEFAULT_TASKS;
use wedplan_db::repository::SurrealTaskRepository;

async fn setup() -> TaskProvisioner<SurrealTaskRepository<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    wedplan_db::run_migrations(&db).await.unwrap();
    TaskProvisioner::new(SurrealTaskRepository::new(db))
}

#[tokio::test]
async fn ensure_twice_leaves_nine_tasks() {
    let provisioner = setup().await;
    let order_id = Uuid::new_v4();

    let first = provisioner.ensure_default_tasks(order_id).await.unwrap();
    let second = provisioner.ensure_default_tasks(order_id).await.unwrap();

    assert_eq!(first.len(), 9);
    let first_ids: Vec<_> = first.iter().map(|t| t.id).collect();
    let second_ids: Vec<_> = second.iter().map(|t| t.id).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn concurrent_provisioning_converges() {
    let provisioner = setup().await;
    let order_id = Uuid::new_v4();

    let (a, b) = tokio::join!(
        provisioner.ensure_default_tasks(order_id),
        provisioner.ensure_default_tasks(order_id),
    );

    assert_eq!(a.unwrap().len(), 9);
    assert_eq!(b.unwrap().len(), 9);
    assert_eq!(provisioner.tasks_of(order_id).await.unwrap().len(), 9);
}

#[tokio::test]
async fn existing_progress_is_kept() {
    let provisioner = setup().await;
    let order_id = Uuid::new_v4();

    let tasks = provisioner.ensure_default_tasks(order_id).await.unwrap();
    provisioner.toggle_task(tasks[0].id, true).await.unwrap();

    let again = provisioner.ensure_default_tasks(order_id).await.unwrap();
    assert!(again[0].is_done);
    assert_eq!(again[0].name, DEFAULT_TASKS[0]);
}

#[tokio::test]
async fn toggle_is_idempotent() {
    let provisioner = setup().await;
    let tasks = provisioner
        .ensure_default_tasks(Uuid::new_v4())
        .await
        .unwrap();

    let once = provisioner.toggle_task(tasks[3].id, true).await.unwrap();
    let twice = provisioner.toggle_task(tasks[3].id, true).await.unwrap();

    assert!(once.is_done && twice.is_done);
    assert_eq!(once.id, twice.id);
    assert!(twice.updated_at >= once.updated_at);
}

#[tokio::test]
async fn toggling_unknown_task_is_not_found() {
    let provisioner = setup().await;

    assert!(matches!(
        provisioner.toggle_task(Uuid::new_v4(), true).await,
        Err(WedplanError::NotFound { .. })
    ));
}
