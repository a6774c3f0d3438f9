//! SurrealDB implementation of [`PackageRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use wedplan_core::error::WedplanResult;
use wedplan_core::models::package::{CreatePackage, Package};
use wedplan_core::repository::PackageRepository;

use crate::error::DbError;
use crate::rows::parse_uuid;

#[derive(Debug, SurrealValue)]
struct PackageRow {
    record_id: String,
    name: String,
    description: String,
    price: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl PackageRow {
    fn try_into_package(self) -> Result<Package, DbError> {
        Ok(Package {
            id: parse_uuid("package", &self.record_id)?,
            name: self.name,
            description: self.description,
            price: self.price,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

fn collect(rows: Vec<PackageRow>) -> Result<Vec<Package>, DbError> {
    rows.into_iter().map(PackageRow::try_into_package).collect()
}

/// SurrealDB implementation of the Package repository.
#[derive(Clone)]
pub struct SurrealPackageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPackageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PackageRepository for SurrealPackageRepository<C> {
    async fn create(&self, input: CreatePackage) -> WedplanResult<Package> {
        let id = Uuid::new_v4();

        self.db
            .query(
                "CREATE type::record('package', $id) SET \
                 name = $name, description = $description, \
                 price = $price, is_active = $is_active",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("price", input.price))
            .bind(("is_active", input.is_active))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> WedplanResult<Package> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('package', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PackageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "package".into(),
            id: id_str,
        })?;

        Ok(row.try_into_package()?)
    }

    async fn list_active(&self) -> WedplanResult<Vec<Package>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM package \
                 WHERE is_active = true ORDER BY price ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PackageRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_all(&self) -> WedplanResult<Vec<Package>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM package ORDER BY price ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PackageRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
