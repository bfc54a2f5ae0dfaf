use std::fmt;

// ---------------------------------------------------------------------------
// Sample – one (time, cwnd) observation
// ---------------------------------------------------------------------------

/// A single congestion-window observation.
///
/// `time` is always finite and non-negative; the loader rejects anything
/// else before a `Sample` is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the start of the simulation.
    pub time: f64,
    /// Congestion window in bytes.
    pub cwnd: u64,
}

impl Sample {
    pub fn new(time: f64, cwnd: u64) -> Self {
        Sample { time, cwnd }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.cwnd)
    }
}

// ---------------------------------------------------------------------------
// Series – samples in file order
// ---------------------------------------------------------------------------

/// Samples in the order they appeared in the source file.
///
/// Time is not guaranteed to be monotonic, so consumers must not sort or
/// binary-search on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(samples: Vec<Sample>) -> Self {
        Series { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Points as `(time, cwnd)` pairs, ready for plotting.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.time, s.cwnd as f64))
    }

    /// `None` for an empty series.
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        let peak_cwnd = self.samples.iter().map(|s| s.cwnd).max().unwrap_or(0);
        Some(SeriesSummary {
            samples: self.samples.len(),
            start: first.time,
            end: last.time,
            peak_cwnd,
        })
    }
}

impl From<Vec<Sample>> for Series {
    fn from(samples: Vec<Sample>) -> Self {
        Series::new(samples)
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Series::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// SeriesSummary
// ---------------------------------------------------------------------------

/// Headline numbers for a loaded series, logged before rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub samples: usize,
    /// Timestamp of the first sample in file order.
    pub start: f64,
    /// Timestamp of the last sample in file order.
    pub end: f64,
    pub peak_cwnd: u64,
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples, {:.3}s → {:.3}s, peak cwnd {} bytes",
            self.samples, self.start, self.end, self.peak_cwnd
        )
    }
}
