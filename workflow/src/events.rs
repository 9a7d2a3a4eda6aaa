use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain events handed to the reactive engines.
///
/// Emitted by the workflows at the point the underlying row is committed;
/// there is no queue or sweep, the consumer runs in the same call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StudentEvent {
    /// A new violation row was persisted for the student.
    ViolationRecorded {
        student_id: i64,
        violation_id: i64,
        violation_date: NaiveDate,
        recorded_at: DateTime<Utc>,
    },
}

impl StudentEvent {
    pub fn student_id(&self) -> i64 {
        match self {
            StudentEvent::ViolationRecorded { student_id, .. } => *student_id,
        }
    }
}
