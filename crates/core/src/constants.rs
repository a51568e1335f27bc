//! Constants used throughout the MediFlow core crate.
//!
//! File names and record defaults live here so the store, the queue and the line codec agree.

/// Default directory for clinic data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename for the permanent patient records.
pub const PATIENTS_FILENAME: &str = "patients.txt";

/// Filename for the persisted waiting queue.
pub const QUEUE_FILENAME: &str = "queue_log.txt";

/// Delimiter between fields of a persisted record line.
pub const FIELD_DELIMITER: char = ',';

/// Number of fields in a persisted record line.
pub const FIELD_COUNT: usize = 6;

/// Priority given to records that do not specify one (Normal).
pub const DEFAULT_PRIORITY: i32 = 3;
