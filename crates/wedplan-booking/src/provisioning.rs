//! Preparation checklist provisioning and task updates.

use tracing::{debug, info};
use uuid::Uuid;
use wedplan_core::error::WedplanResult;
use wedplan_core::models::task::{DEFAULT_TASKS, PreparationTask};
use wedplan_core::repository::TaskRepository;

pub struct TaskProvisioner<T: TaskRepository> {
    tasks: T,
}

impl<T: TaskRepository> TaskProvisioner<T> {
    pub fn new(tasks: T) -> Self {
        Self { tasks }
    }

    /// Make sure the order has its checklist, creating the default one
    /// if it has none. Existing tasks are returned untouched.
    pub async fn ensure_default_tasks(&self, order_id: Uuid) -> WedplanResult<Vec<PreparationTask>> {
        let existing = self.tasks.list_for_order(order_id).await?;
        if !existing.is_empty() {
            debug!(%order_id, count = existing.len(), "Checklist already present");
            return Ok(existing);
        }

        match self.tasks.create_checklist(order_id, &DEFAULT_TASKS).await {
            Ok(created) => {
                info!(%order_id, count = created.len(), "Checklist provisioned");
                Ok(created)
            }
            Err(e) => {
                // A concurrent approval may have provisioned first.
                let existing = self.tasks.list_for_order(order_id).await?;
                if existing.is_empty() {
                    return Err(e);
                }
                debug!(%order_id, "Checklist provisioned concurrently");
                Ok(existing)
            }
        }
    }

    pub async fn toggle_task(&self, task_id: Uuid, is_done: bool) -> WedplanResult<PreparationTask> {
        let task = self.tasks.set_done(task_id, is_done).await?;
        debug!(%task_id, is_done, "Task updated");
        Ok(task)
    }

    /// Tasks of an order in checklist order. Callers resolve the order.
    pub async fn tasks_of(&self, order_id: Uuid) -> WedplanResult<Vec<PreparationTask>> {
        self.tasks.list_for_order(order_id).await
    }
}
