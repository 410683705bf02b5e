use super::layout::Layout;
use super::FileSystemStore;
use crate::storage::health::{HealthReport, HealthStatus};
use crate::storage::StorageKind;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::atomic::Ordering;
use tokio::fs;
use tracing::warn;
use walkdir::WalkDir;

const PROBE_FILE: &str = ".health_probe";

/// Disk space, directory writability and usage of a filesystem store.
pub(super) async fn check(store: &FileSystemStore) -> HealthReport {
    let layout = &store.layout;
    let mut report = HealthReport::new(HealthStatus::Healthy, StorageKind::Filesystem)
        .with_detail("root", layout.root().display().to_string());

    if store.closed.load(Ordering::Acquire) {
        report.downgrade(HealthStatus::Unhealthy);
        return report.with_detail("closed", true);
    }

    let mut writable = Map::new();
    for dir in layout.eager_dirs() {
        let ok = probe_writable(&dir).await;
        if !ok {
            warn!(dir = %dir.display(), "Storage directory is not writable");
            report.downgrade(HealthStatus::Unhealthy);
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writable.insert(name, Value::Bool(ok));
    }
    report.details.insert("writable".to_string(), Value::Object(writable));

    match fs4::available_space(layout.root()) {
        Ok(available) => {
            if available < store.config.min_free_bytes {
                report.downgrade(HealthStatus::Degraded);
            }
            report = report
                .with_detail("available_bytes", available)
                .with_detail("min_free_bytes", store.config.min_free_bytes);
        }
        Err(e) => {
            warn!("Could not determine free disk space: {e}");
            report.downgrade(HealthStatus::Degraded);
            report = report.with_detail("available_bytes_error", e.to_string());
        }
    }

    let root = layout.root().to_path_buf();
    match tokio::task::spawn_blocking(move || usage(&root)).await {
        Ok(usage) => {
            report = report
                .with_detail("document_count", usage.documents)
                .with_detail("used_bytes", usage.bytes);
        }
        Err(e) => {
            warn!("Disk usage scan failed: {e}");
            report.downgrade(HealthStatus::Degraded);
        }
    }
    report
}

async fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(PROBE_FILE);
    fs::write(&probe, b"ok").await.is_ok() && fs::remove_file(&probe).await.is_ok()
}

struct Usage {
    documents: u64,
    bytes: u64,
}

fn usage(root: &Path) -> Usage {
    let mut usage = Usage {
        documents: 0,
        bytes: 0,
    };
    let documents_dir = Layout::new(root).documents_dir();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        usage.bytes = usage
            .bytes
            .saturating_add(entry.metadata().map_or(0, |m| m.len()));
        if entry.path().parent() == Some(documents_dir.as_path()) {
            usage.documents = usage.documents.saturating_add(1);
        }
    }
    usage
}
