//! Lock diagnostics for the store file.
//!
//! When the gateway exhausts its open attempts it attaches a report of
//! what can be observed about the database file: existence, permission
//! probes, SQLite sidecar files left by other connections, and (best
//! effort, Linux only) which processes hold the file open. The report is
//! meant for operator-facing error messages, not automatic remediation.

use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Observations about the database file backing a connection URL.
#[derive(Debug, Clone)]
pub struct LockDiagnostic {
    /// Filesystem path resolved from the URL; `None` for in-memory stores
    pub path: Option<PathBuf>,
    pub exists: bool,
    pub readable: bool,
    pub writable: bool,
    /// `-wal` / `-shm` / `-journal` sidecars present next to the file
    pub sidecar_files: Vec<String>,
    /// `pid (name)` of processes holding the file open, when discoverable
    pub holders: Vec<String>,
}

impl fmt::Display for LockDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Store diagnostic:")?;
        match &self.path {
            None => writeln!(f, "  - no database file (in-memory store)")?,
            Some(path) => {
                writeln!(
                    f,
                    "  - database file: {} ({})",
                    path.display(),
                    if self.exists { "present" } else { "missing" }
                )?;
                if self.exists {
                    writeln!(
                        f,
                        "  - readable: {}, writable: {}",
                        if self.readable { "yes" } else { "no" },
                        if self.writable { "yes" } else { "no" }
                    )?;
                }
                for sidecar in &self.sidecar_files {
                    writeln!(f, "  - lock sidecar present: {sidecar}")?;
                }
                for holder in &self.holders {
                    writeln!(f, "  - held open by: {holder}")?;
                }
            }
        }
        Ok(())
    }
}

/// Inspects the database file behind `database_url`.
pub fn inspect(database_url: &str) -> LockDiagnostic {
    let path = database_file_path(database_url);
    let Some(path) = path else {
        return LockDiagnostic {
            path: None,
            exists: false,
            readable: false,
            writable: false,
            sidecar_files: Vec::new(),
            holders: Vec::new(),
        };
    };

    let exists = path.exists();
    // Probe by actually opening rather than trusting metadata.
    let readable = exists && OpenOptions::new().read(true).open(&path).is_ok();
    let writable = exists && OpenOptions::new().append(true).open(&path).is_ok();

    let sidecar_files = ["-wal", "-shm", "-journal"]
        .iter()
        .filter_map(|suffix| {
            let mut sidecar = path.as_os_str().to_os_string();
            sidecar.push(suffix);
            let sidecar = PathBuf::from(sidecar);
            sidecar
                .exists()
                .then(|| sidecar.display().to_string())
        })
        .collect();

    let holders = processes_holding(&path);

    LockDiagnostic {
        path: Some(path),
        exists,
        readable,
        writable,
        sidecar_files,
        holders,
    }
}

/// Extracts the filesystem path from a SQLite connection URL. Returns
/// `None` for in-memory stores.
fn database_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let rest = rest.split('?').next().unwrap_or(rest);
    if rest.is_empty() || rest == ":memory:" {
        return None;
    }
    Some(PathBuf::from(rest))
}

/// Best-effort scan for other processes with the file open. Only
/// implemented on Linux, where `/proc/<pid>/fd` can be read without
/// additional dependencies; elsewhere the list is empty.
#[cfg(target_os = "linux")]
fn processes_holding(path: &Path) -> Vec<String> {
    let Ok(target) = path.canonicalize() else {
        return Vec::new();
    };
    let Ok(proc_entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };

    let mut holders = Vec::new();
    for entry in proc_entries.flatten() {
        let pid = entry.file_name();
        let Some(pid) = pid.to_str().filter(|p| p.chars().all(|c| c.is_ascii_digit())) else {
            continue;
        };
        let fd_dir = entry.path().join("fd");
        let Ok(fds) = std::fs::read_dir(&fd_dir) else {
            continue;
        };
        let holds_file = fds
            .flatten()
            .filter_map(|fd| std::fs::read_link(fd.path()).ok())
            .any(|link| link == target);
        if holds_file {
            let name = std::fs::read_to_string(entry.path().join("comm"))
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            holders.push(format!("pid {pid} ({name})"));
        }
    }
    holders
}

#[cfg(not(target_os = "linux"))]
fn processes_holding(_path: &Path) -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn url_parsing_resolves_file_paths() {
        assert_eq!(
            database_file_path("sqlite://data/ledger.sqlite?mode=rwc"),
            Some(PathBuf::from("data/ledger.sqlite"))
        );
        assert_eq!(
            database_file_path("sqlite:/tmp/ledger.sqlite"),
            Some(PathBuf::from("/tmp/ledger.sqlite"))
        );
        assert_eq!(database_file_path("sqlite::memory:"), None);
        assert_eq!(database_file_path("postgres://example"), None);
    }

    #[test]
    fn inspect_reports_missing_file() {
        let report = inspect("sqlite:///nonexistent/dir/ledger.sqlite");
        assert!(!report.exists);
        assert!(report.to_string().contains("missing"));
    }

    #[test]
    fn inspect_reports_present_file_and_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ledger.sqlite");
        std::fs::File::create(&db_path).unwrap();
        let mut wal = std::fs::File::create(dir.path().join("ledger.sqlite-wal")).unwrap();
        wal.write_all(b"x").unwrap();

        let url = format!("sqlite://{}", db_path.display());
        let report = inspect(&url);
        assert!(report.exists);
        assert!(report.readable);
        assert!(report.writable);
        assert_eq!(report.sidecar_files.len(), 1);
        assert!(report.sidecar_files[0].ends_with("-wal"));

        let rendered = report.to_string();
        assert!(rendered.contains("present"));
        assert!(rendered.contains("-wal"));
    }

    #[test]
    fn inspect_handles_memory_store() {
        let report = inspect("sqlite::memory:");
        assert!(report.path.is_none());
        assert!(report.to_string().contains("in-memory"));
    }
}
