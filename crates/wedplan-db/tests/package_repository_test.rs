//! Integration tests for the Package repository.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use wedplan_core::error::WedplanError;
use wedplan_core::models::package::CreatePackage;
use wedplan_core::repository::PackageRepository;
use wedplan_db::repository::SurrealPackageRepository;

fn package(name: &str, price: i64, is_active: bool) -> CreatePackage {
    CreatePackage {
        name: name.into(),
        description: format!("{name} wedding package"),
        price,
        is_active,
    }
}

#[tokio::test]
async fn list_active_hides_inactive_and_sorts_by_price() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    wedplan_db::run_migrations(&db).await.unwrap();
    let repo = SurrealPackageRepository::new(db);

    repo.create(package("Gold", 150_000_000, true)).await.unwrap();
    repo.create(package("Silver", 75_000_000, true)).await.unwrap();
    let retired = repo.create(package("Legacy", 10_000_000, false)).await.unwrap();

    let active = repo.list_active().await.unwrap();
    let names: Vec<_> = active.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Silver", "Gold"]);

    assert_eq!(repo.list_all().await.unwrap().len(), 3);
    assert!(!repo.get_by_id(retired.id).await.unwrap().is_active);
}

#[tokio::test]
async fn unknown_package_is_not_found() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    wedplan_db::run_migrations(&db).await.unwrap();
    let repo = SurrealPackageRepository::new(db);

    assert!(matches!(
        repo.get_by_id(uuid::Uuid::new_v4()).await,
        Err(WedplanError::NotFound { .. })
    ));
}
