//! Target list loading.
//!
//! Reads the input file, normalizes each line into an [`Endpoint`] and drops
//! duplicates while keeping first-seen order. Malformed lines are reported one
//! by one and excluded; they never abort the run.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tagscan_common::error::{ParseError, ScanError};
use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::warn;

/// A line that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the input.
    pub line_no: usize,
    pub content: String,
    pub error: ParseError,
}

/// The normalized scan set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    pub endpoints: Vec<Endpoint>,
    pub malformed: Vec<MalformedLine>,
    /// Lines that normalized to an endpoint already in the list.
    pub duplicates: usize,
}

impl TargetList {
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Reads and normalizes the target file at `path`.
///
/// An unreadable file is a [`ScanError::Setup`] and must be reported before
/// any probing starts.
pub fn load_targets(path: &Path, default_port: u16) -> Result<TargetList, ScanError> {
    let content = fs::read_to_string(path).map_err(|source| ScanError::Setup {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_targets(content.lines(), default_port))
}

/// Normalizes raw lines. Blank lines are skipped silently.
pub fn parse_targets<'a, I>(lines: I, default_port: u16) -> TargetList
where
    I: IntoIterator<Item = &'a str>,
{
    let mut list = TargetList::default();
    let mut seen: HashSet<Endpoint> = HashSet::new();

    for (idx, line) in lines.into_iter().enumerate() {
        match Endpoint::parse(line, default_port) {
            Ok(endpoint) => {
                if seen.insert(endpoint.clone()) {
                    list.endpoints.push(endpoint);
                } else {
                    list.duplicates += 1;
                }
            }
            Err(ParseError::Empty) => {}
            Err(error) => {
                warn!("Skipping line {}: '{}' ({error})", idx + 1, line.trim());
                list.malformed.push(MalformedLine {
                    line_no: idx + 1,
                    content: line.trim().to_string(),
                    error,
                });
            }
        }
    }

    list
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
