//! SurrealDB implementation of [`TaskRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use wedplan_core::error::WedplanResult;
use wedplan_core::models::task::PreparationTask;
use wedplan_core::repository::TaskRepository;

use crate::error::DbError;
use crate::rows::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TaskRow {
    record_id: String,
    order_id: String,
    position: u32,
    name: String,
    is_done: bool,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn try_into_task(self) -> Result<PreparationTask, DbError> {
        Ok(PreparationTask {
            id: parse_uuid("task", &self.record_id)?,
            order_id: parse_uuid("order", &self.order_id)?,
            position: self.position,
            name: self.name,
            is_done: self.is_done,
            updated_at: self.updated_at,
        })
    }
}

/// One `CREATE` per checklist item, all inside a single transaction.
fn checklist_query(len: usize) -> String {
    let mut query = String::from("BEGIN TRANSACTION;\n");
    for i in 0..len {
        query.push_str(&format!(
            "CREATE type::record('preparation_task', $id_{i}) SET \
             order_id = $order_id, position = $position_{i}, \
             name = $name_{i}, is_done = false;\n"
        ));
    }
    query.push_str("COMMIT TRANSACTION;");
    query
}

/// SurrealDB implementation of the preparation task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<PreparationTask, DbError> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('preparation_task', $id)",
            )
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<TaskRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        row.try_into_task()
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn list_for_order(&self, order_id: Uuid) -> WedplanResult<Vec<PreparationTask>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM preparation_task \
                 WHERE order_id = $order_id ORDER BY position ASC",
            )
            .bind(("order_id", order_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let tasks = rows
            .into_iter()
            .map(TaskRow::try_into_task)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tasks)
    }

    async fn create_checklist(
        &self,
        order_id: Uuid,
        names: &[&str],
    ) -> WedplanResult<Vec<PreparationTask>> {
        let query = checklist_query(names.len());

        let mut builder = self
            .db
            .query(&query)
            .bind(("order_id", order_id.to_string()));
        for (i, name) in names.iter().enumerate() {
            builder = builder
                .bind((format!("id_{i}"), Uuid::new_v4().to_string()))
                .bind((format!("position_{i}"), (i + 1) as u32))
                .bind((format!("name_{i}"), name.to_string()));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.list_for_order(order_id).await
    }

    async fn set_done(&self, id: Uuid, is_done: bool) -> WedplanResult<PreparationTask> {
        // Resolve first so an unknown id is a NotFound, not an empty update.
        self.get_by_id(id).await?;

        self.db
            .query(
                "UPDATE type::record('preparation_task', $id) SET \
                 is_done = $is_done, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("is_done", is_done))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(self.get_by_id(id).await?)
    }
}
