use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{Sample, Series};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a trace file cannot be turned into a [`Series`].
///
/// Individual malformed lines are not errors; see [`MalformedLine`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::FileNotFound { path } | LoadError::Read { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::FileNotFound { .. })
    }
}

/// A two-token line whose tokens did not parse as `<time> <cwnd>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedLine<'a> {
    pub path: &'a Path,
    /// 1-based.
    pub line_no: usize,
    /// The line with surrounding whitespace stripped.
    pub content: &'a str,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a congestion-window trace, logging skipped lines as warnings.
pub fn load(path: &Path) -> Result<Series, LoadError> {
    load_with(path, |bad| {
        log::warn!(
            "ignoring malformed line {} in {}: {}",
            bad.line_no,
            bad.path.display(),
            bad.content
        );
    })
}

/// Load a congestion-window trace, handing every malformed line to
/// `on_malformed`.
///
/// Lines that do not split into exactly two tokens (blank lines, stray
/// headers) are dropped without reaching the callback.
pub fn load_with<F>(path: &Path, on_malformed: F) -> Result<Series, LoadError>
where
    F: FnMut(MalformedLine<'_>),
{
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    parse_series(BufReader::new(file), path, on_malformed).map_err(read_err)
}

/// Parse `<time> <cwnd>` lines from any buffered reader.
///
/// `origin` is only used to label diagnostics.
pub fn parse_series<R, F>(reader: R, origin: &Path, mut on_malformed: F) -> io::Result<Series>
where
    R: BufRead,
    F: FnMut(MalformedLine<'_>),
{
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        let mut tokens = trimmed.split_whitespace();
        let (Some(time_tok), Some(cwnd_tok), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };

        match parse_sample(time_tok, cwnd_tok) {
            Some(sample) => samples.push(sample),
            None => on_malformed(MalformedLine {
                path: origin,
                line_no: idx + 1,
                content: trimmed,
            }),
        }
    }

    Ok(Series::new(samples))
}

fn parse_sample(time_tok: &str, cwnd_tok: &str) -> Option<Sample> {
    let time = time_tok.parse::<f64>().ok()?;
    if !time.is_finite() || time < 0.0 {
        return None;
    }
    let cwnd = cwnd_tok.parse::<u64>().ok()?;
    Some(Sample::new(time, cwnd))
}
