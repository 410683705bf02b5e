//! Versioned document storage with interchangeable filesystem and key-value
//! backends.
//!
//! Open a store with [`open_store`], then use the [`DocumentStore`] contract
//! (and the [`DocumentStoreExt`] workflows) through the returned handle.
#![allow(unknown_lints, renamed_and_removed_lints)]
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod config;
pub mod document;
pub mod logging;
pub mod metrics;
pub mod storage;
pub mod utils;

pub use config::{load_config, load_config_from, StoreConfig};
pub use document::{
    AuditAction, AuditLogEntry, Changes, Content, Document, DocumentType, DocumentVersion,
    HistoryEntry, Metadata, ProcessingStage,
};
pub use storage::{
    open_store, DocumentStore, DocumentStoreExt, ErrorKind, HealthReport, HealthStatus, ListQuery,
    StorageError, StorageKind, StoreHandle,
};
