use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

labelled_enum!(
    /// Where a walk-in patient is in the queue.
    QueueStatus {
        Waiting => "waiting",
        InProgress => "in_progress",
        Completed => "completed",
        NoShow => "no_show",
    }
);

impl QueueStatus {
    pub fn title(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "Waiting",
            QueueStatus::InProgress => "In Progress",
            QueueStatus::Completed => "Completed",
            QueueStatus::NoShow => "No Show",
        }
    }

    /// Completed and no-show entries have left the queue for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::NoShow)
    }
}

/// A walk-in patient's place in a department's queue.
///
/// Hosted-service exports name every field with a `_c` suffix and embed lookups
/// for the patient and department; both spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    #[serde(rename = "Id", default)]
    pub id: u64,
    #[serde(alias = "patient_id_c", deserialize_with = "super::reference::deserialize")]
    pub patient_id: u64,
    #[serde(
        alias = "department_id_c",
        deserialize_with = "super::reference::deserialize"
    )]
    pub department_id: u64,
    /// Display identifier handed to the patient, e.g. `Q482913`.
    #[serde(alias = "ticket_number_c")]
    pub ticket_number: String,
    /// Rank among the department's waiting entries. Stale once the entry leaves
    /// the waiting state.
    #[serde(alias = "position_c")]
    pub position: u32,
    #[serde(alias = "status_c")]
    pub status: QueueStatus,
    #[serde(alias = "check_in_time_c", with = "time::serde::rfc3339")]
    pub check_in_time: OffsetDateTime,
    #[serde(
        alias = "completed_at_c",
        with = "time::serde::rfc3339::option",
        default
    )]
    pub completed_at: Option<OffsetDateTime>,
    /// Time of the last status change.
    #[serde(alias = "updated_at_c", with = "time::serde::rfc3339::option", default)]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(alias = "notes_c", default)]
    pub notes: String,
}

record_kind!(QueueEntry, "queue_entries");

/// A request to add a walk-in patient to a department's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub patient_id: u64,
    pub department_id: u64,
    pub notes: String,
}
