//! The patient record value type.
//!
//! A [`Record`] is the unit stored by both the [`RecordStore`](crate::RecordStore) and the
//! [`WaitQueue`](crate::WaitQueue). It carries no behaviour beyond construction and a few
//! read-only helpers; each structure owns its own copies.

use crate::constants::DEFAULT_PRIORITY;
use mediflow_types::Priority;
use serde::{Deserialize, Serialize};

/// One patient's identity and clinical data.
///
/// `id` is the intended-unique business key but uniqueness is not enforced anywhere.
/// `admission_date` is conventionally `YYYY-MM-DD` and is stored unvalidated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub condition: String,
    /// Triage level: 1 = Critical, 2 = Urgent, 3 = Normal. Lower is more urgent.
    pub priority: i32,
    pub admission_date: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        condition: impl Into<String>,
        priority: i32,
        admission_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            condition: condition.into(),
            priority,
            admission_date: admission_date.into(),
        }
    }

    /// Maps the stored priority level onto a [`Priority`], if it is in range.
    ///
    /// Records restored from disk may carry any integer, so this is fallible.
    pub fn triage(&self) -> Option<Priority> {
        Priority::try_from(self.priority).ok()
    }

    /// Label used when displaying the priority ("Critical", "Urgent", "Normal" or "Unknown").
    pub fn priority_label(&self) -> &'static str {
        self.triage().map_or("Unknown", Priority::label)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            age: 0,
            condition: String::new(),
            priority: DEFAULT_PRIORITY,
            admission_date: String::new(),
        }
    }
}
