//! `ems-audit` — incident audit trail.
//!
//! Every state change the dispatch engine makes is described by an
//! [`AuditEntry`] and handed to an [`AuditSink`].  Three sinks are provided:
//!
//! | Feature   | Sink                | Output                     |
//! |-----------|---------------------|----------------------------|
//! | *(none)*  | `MemoryAuditLog`    | in-process `Vec`           |
//! | *(none)*  | `CsvAuditWriter`    | `audit_log.csv`            |
//! | `sqlite`  | `SqliteAuditWriter` | `audit.db`                 |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ems_audit::CsvAuditWriter;
//!
//! let audit = CsvAuditWriter::new(Path::new("./output"))?;
//! let mut dispatcher = Dispatcher::new(config, store, DijkstraRouter, audit);
//! // ...
//! if let Some(e) = dispatcher.take_audit_error() {
//!     eprintln!("audit error: {e}");
//! }
//! ```

pub mod csv_writer;
pub mod entry;
pub mod error;
pub mod sink;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv_writer::CsvAuditWriter;
pub use entry::{Actor, AuditEntry, AuditKind};
pub use error::{AuditError, AuditResult};
pub use sink::{AuditSink, MemoryAuditLog};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAuditWriter;
