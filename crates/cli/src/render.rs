//! Plain-text tables for terminal output.

use mediflow_core::{Record, WaitQueue};
use std::fmt::Write;

pub fn record_detail(record: &Record) -> String {
    format!(
        "ID: {}\nName: {}\nAge: {}\nCondition: {}\nPriority: {} ({})\nAdmitted: {}\n",
        record.id,
        record.name,
        record.age,
        record.condition,
        record.priority,
        record.priority_label(),
        record.admission_date
    )
}

pub fn records_table(records: &[&Record]) -> String {
    if records.is_empty() {
        return "No patient records found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} | {:<20} | {:>3} | {:<8} | Condition",
        "ID", "Name", "Age", "Priority"
    );
    let _ = writeln!(out, "{:-<8}-|-{:-<20}-|-{:->3}-|-{:-<8}-|-{:-<18}", "", "", "", "", "");
    for record in records {
        let _ = writeln!(
            out,
            "{:<8} | {:<20} | {:>3} | {:<8} | {}",
            record.id,
            record.name,
            record.age,
            record.priority_label(),
            record.condition
        );
    }
    let _ = writeln!(out, "\nTotal patients: {}", records.len());
    out
}

pub fn queue_table(queue: &WaitQueue) -> String {
    if queue.is_empty() {
        return "Queue is empty.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>8} | {:<8} | {:<20} | {:<8} | Condition",
        "Position", "ID", "Name", "Priority"
    );
    let _ = writeln!(out, "{:->8}-|-{:-<8}-|-{:-<20}-|-{:-<8}-|-{:-<18}", "", "", "", "", "");
    for (rank, record) in queue.display_order() {
        let _ = writeln!(
            out,
            "{:>8} | {:<8} | {:<20} | {:<8} | {}",
            rank,
            record.id,
            record.name,
            record.priority_label(),
            record.condition
        );
    }
    out
}
