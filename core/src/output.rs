//! Result files.
//!
//! Layout under the output root:
//! * `<model>.txt`: one endpoint per line, sorted by host, then by numeric port.
//! * `failed_hosts.txt`: census mode only.
//!
//! Each file is written to a temporary sibling and renamed into place, so an
//! interrupted or failed write never leaves a truncated listing behind. A
//! failed file is recorded in the [`WriteReport`] and the remaining files are
//! still attempted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tagscan_common::config::ScanMode;
use tagscan_common::error::{ScanError, WriteFailure};
use tagscan_common::network::endpoint::Endpoint;
use tracing::{debug, warn};

use crate::aggregator::AggregateState;

pub const FAILED_HOSTS_FILE: &str = "failed_hosts.txt";
const LISTING_EXTENSION: &str = "txt";
const VALIDATION_STEM_LIMIT: usize = 45;

/// Files produced by [`OutputWriter::write`].
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct OutputWriter {
    root: PathBuf,
    mode: ScanMode,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, mode: ScanMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output root. Validation mode also clears listings left by
    /// a previous run; census mode keeps them.
    pub fn prepare(&self) -> Result<(), ScanError> {
        let root_err = |source: io::Error| ScanError::OutputRoot {
            path: self.root.clone(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(root_err)?;

        if self.mode == ScanMode::Validation {
            for entry in fs::read_dir(&self.root).map_err(root_err)? {
                let path = entry.map_err(root_err)?.path();
                if is_listing(&path) {
                    fs::remove_file(&path).map_err(root_err)?;
                    debug!(path = %path.display(), "removed stale listing");
                }
            }
        }

        Ok(())
    }

    /// Writes every model listing (and the failure listing in census mode).
    pub fn write(&self, state: &AggregateState) -> WriteReport {
        let mut report = WriteReport::default();

        for (stem, endpoints) in self.group_by_file(state) {
            let path = self.root.join(format!("{stem}.{LISTING_EXTENSION}"));
            self.write_one(path, endpoints.into_iter(), &mut report);
        }

        if self.mode == ScanMode::Census {
            let path = self.root.join(FAILED_HOSTS_FILE);
            self.write_one(path, state.failed_endpoints.iter(), &mut report);
        }

        report
    }

    /// Maps model names to file stems. Models sharing a stem share a file.
    fn group_by_file<'a>(
        &self,
        state: &'a AggregateState,
    ) -> BTreeMap<String, BTreeSet<&'a Endpoint>> {
        let mut files: BTreeMap<String, BTreeSet<&Endpoint>> = BTreeMap::new();

        for (model, endpoints) in &state.models_to_endpoints {
            let mut stem = safe_file_stem(model);
            if self.mode == ScanMode::Validation {
                stem = stem.chars().take(VALIDATION_STEM_LIMIT).collect();
            }
            let collides = format!("{stem}.{LISTING_EXTENSION}") == FAILED_HOSTS_FILE;
            if self.mode == ScanMode::Census && collides {
                stem = format!("model_{stem}");
            }
            files.entry(stem).or_default().extend(endpoints.iter());
        }

        files
    }

    fn write_one<'a, I>(&self, path: PathBuf, endpoints: I, report: &mut WriteReport)
    where
        I: Iterator<Item = &'a Endpoint>,
    {
        let mut content = String::new();
        for endpoint in endpoints {
            content.push_str(&endpoint.to_string());
            content.push('\n');
        }

        match write_atomic(&path, content.as_bytes()) {
            Ok(()) => report.written.push(path),
            Err(source) => {
                warn!(path = %path.display(), "failed to write listing: {source}");
                report.failed.push(WriteFailure { path, source });
            }
        }
    }
}

/// Replaces characters that are unsafe in file names and lower-cases the result.
pub fn safe_file_stem(model: &str) -> String {
    model
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | ' ' => '_',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

fn is_listing(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == LISTING_EXTENSION)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
