//! Line-oriented persistence shared by the record store and the waiting queue.
//!
//! Each record is written on its own line with the fields in declaration order:
//!
//! ```text
//! id,name,age,condition,priority,admission_date
//! ```
//!
//! There is no escaping. A field containing the delimiter shifts the remaining fields when the
//! line is read back.
//!
//! Reading is lenient on purpose: a line with missing trailing fields still yields a record, with
//! the missing fields left at their defaults (empty text, age 0, priority 3). Unparseable numbers
//! fall back to the same defaults. Blank lines are skipped.
//!
//! A missing source file is not an error; it reads as an empty collection. A target that cannot
//! be opened for writing is reported as [`ClinicError::StorageWrite`] and nothing is written.

use crate::constants::{DEFAULT_PRIORITY, FIELD_COUNT, FIELD_DELIMITER};
use crate::error::{ClinicError, ClinicResult};
use crate::record::Record;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Render a record as a single line, without the trailing newline.
pub fn encode_line(record: &Record) -> String {
    let d = FIELD_DELIMITER;
    format!(
        "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
        record.id,
        record.name,
        record.age,
        record.condition,
        record.priority,
        record.admission_date
    )
}

/// Parse a line into a record, defaulting any missing or unparseable fields.
///
/// The line is split into at most six fields, so anything after the fifth delimiter belongs to
/// the admission date.
pub fn decode_line(line: &str) -> Record {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = line.splitn(FIELD_COUNT, FIELD_DELIMITER);

    let mut text = || fields.next().unwrap_or_default().to_string();
    let id = text();
    let name = text();
    let age = text();
    let condition = text();
    let priority = text();
    let admission_date = text();

    Record {
        id,
        name,
        age: age.trim().parse().unwrap_or(0),
        condition,
        priority: priority.trim().parse().unwrap_or(DEFAULT_PRIORITY),
        admission_date,
    }
}

/// Write records one per line. Returns the number of records written.
pub fn write_records<'a, W, I>(writer: W, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = BufWriter::new(writer);
    let mut written = 0;
    for record in records {
        writeln!(writer, "{}", encode_line(record))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Read every non-blank line as a record, in file order.
pub fn read_records<R: BufRead>(reader: R) -> io::Result<Vec<Record>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(decode_line(&line));
    }
    Ok(records)
}

/// Write records to `path`, replacing any existing content.
///
/// # Errors
///
/// Returns [`ClinicError::StorageWrite`] if the file cannot be created or written. When the file
/// cannot be opened nothing has been written and in-memory state is untouched.
pub fn save_records<'a, I>(path: &Path, records: I) -> ClinicResult<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let file = File::create(path).map_err(|source| {
        tracing::error!("cannot open file for writing: {}", path.display());
        ClinicError::StorageWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    write_records(file, records).map_err(|source| ClinicError::StorageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Read records from `path`.
///
/// Returns `Ok(None)` when the file does not exist, which callers treat as "start fresh".
///
/// # Errors
///
/// Returns [`ClinicError::StorageRead`] for any other I/O failure.
pub fn load_records(path: &Path) -> ClinicResult<Option<Vec<Record>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ClinicError::StorageRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    read_records(BufReader::new(file))
        .map(Some)
        .map_err(|source| ClinicError::StorageRead {
            path: path.to_path_buf(),
            source,
        })
}
