//! Integration tests for the preparation task repository.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use wedplan_core::error::WedplanError;
use wedplan_core::models::task::DEFAULT_TASKS;
use wedplan_core::repository::TaskRepository;
use wedplan_db::repository::SurrealTaskRepository;

async fn setup() -> SurrealTaskRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    wedplan_db::run_migrations(&db).await.unwrap();
    SurrealTaskRepository::new(db)
}

#[tokio::test]
async fn checklist_is_created_in_order() {
    let repo = setup().await;
    let order_id = Uuid::new_v4();

    let tasks = repo
        .create_checklist(order_id, &DEFAULT_TASKS)
        .await
        .unwrap();

    assert_eq!(tasks.len(), 9);
    for (i, task) in tasks.iter().enumerate() {
        assert_eq!(task.position, i as u32 + 1);
        assert_eq!(task.name, DEFAULT_TASKS[i]);
        assert_eq!(task.order_id, order_id);
        assert!(!task.is_done);
    }
}

#[tokio::test]
async fn duplicate_checklist_fails_without_adding_rows() {
    let repo = setup().await;
    let order_id = Uuid::new_v4();

    repo.create_checklist(order_id, &DEFAULT_TASKS)
        .await
        .unwrap();
    assert!(
        repo.create_checklist(order_id, &DEFAULT_TASKS)
            .await
            .is_err()
    );

    assert_eq!(repo.list_for_order(order_id).await.unwrap().len(), 9);
}

#[tokio::test]
async fn checklists_are_scoped_per_order() {
    let repo = setup().await;
    let first = Uuid::new_v4();

    repo.create_checklist(first, &DEFAULT_TASKS).await.unwrap();
    repo.create_checklist(Uuid::new_v4(), &DEFAULT_TASKS[..2])
        .await
        .unwrap();

    assert_eq!(repo.list_for_order(first).await.unwrap().len(), 9);
    assert!(
        repo.list_for_order(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn set_done_toggles_and_persists() {
    let repo = setup().await;
    let order_id = Uuid::new_v4();
    let tasks = repo
        .create_checklist(order_id, &DEFAULT_TASKS)
        .await
        .unwrap();
    let venue = &tasks[1];

    let done = repo.set_done(venue.id, true).await.unwrap();
    assert!(done.is_done);
    assert_eq!(done.name, venue.name);

    let listed = repo.list_for_order(order_id).await.unwrap();
    assert!(listed[1].is_done);
    assert!(!listed[0].is_done);

    let undone = repo.set_done(venue.id, false).await.unwrap();
    assert!(!undone.is_done);
}

#[tokio::test]
async fn set_done_on_unknown_task_is_not_found() {
    let repo = setup().await;

    assert!(matches!(
        repo.set_done(Uuid::new_v4(), true).await,
        Err(WedplanError::NotFound { .. })
    ));
}
