//! Preparation task domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The checklist every confirmed order receives, in display order.
pub const DEFAULT_TASKS: [&str; 9] = [
    "Initial meeting & concept",
    "Venue booking & deposit",
    "Catering selection & deposit",
    "Decoration selection & deposit",
    "Attire fitting & deposit",
    "Photography/videography selection & deposit",
    "Makeup artist selection & deposit",
    "Invitations & souvenirs",
    "Day-of coordination",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparationTask {
    pub id: Uuid,
    pub order_id: Uuid,
    /// 1-based position within the checklist.
    pub position: u32,
    pub name: String,
    pub is_done: bool,
    pub updated_at: DateTime<Utc>,
}
