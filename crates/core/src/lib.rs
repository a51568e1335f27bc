//! # MediFlow Core
//!
//! Core data structures for clinic patient intake.
//!
//! This crate contains two independent, single-owner structures:
//! - [`RecordStore`]: the permanent patient records, a doubly linked list supporting CRUD,
//!   search by id or name, in-place sorting and traversal in both directions
//! - [`WaitQueue`]: the triage waiting queue, kept in priority order with first-come,
//!   first-served ordering among equal priorities
//!
//! Both persist to the same comma-delimited line format (see [`persistence`]).
//!
//! **No shell concerns**: menus, accounts and roles belong to the caller.

pub mod config;
pub mod constants;
pub mod error;
pub mod persistence;
pub mod queue;
pub mod record;
pub mod store;

mod arena;

pub use config::CoreConfig;
pub use error::{ClinicError, ClinicResult};
pub use queue::WaitQueue;
pub use record::Record;
pub use store::{RecordStore, SortOutcome};

pub use mediflow_types::{NonEmptyText, Priority, PriorityError, TextError};
