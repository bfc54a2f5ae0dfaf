//! Run configuration: where the traces live, where the chart goes, and how
//! it looks.
//!
//! Values are layered: built-in defaults, then an optional JSON file given
//! with `--config`, then individual CLI flags.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::style::{Marker, SeriesStyle};

pub const DEFAULT_PREFIX: &str = "lab2-part1-ref";
pub const DEFAULT_OUTPUT: &str = "graphComparacao.png";
/// Largest accepted chart side, in pixels.
pub const MAX_CHART_SIDE: u32 = 16_384;

/// CLI arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "cwnd-plot")]
#[command(about = "Plot TCP CUBIC vs NewReno congestion-window traces")]
pub struct CliArgs {
    /// JSON configuration file; CLI flags override its values
    #[arg(short, long, env = "CWND_PLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// CUBIC trace file (overrides the name derived from --prefix)
    #[arg(long)]
    pub cubic: Option<PathBuf>,

    /// NewReno trace file (overrides the name derived from --prefix)
    #[arg(long)]
    pub newreno: Option<PathBuf>,

    /// Output prefix the simulation was run with
    #[arg(long)]
    pub prefix: Option<String>,

    /// Number of flows the simulation was run with
    #[arg(long)]
    pub flows: Option<u32>,

    /// Socket index whose trace should be plotted
    #[arg(long)]
    pub socket: Option<u32>,

    /// Output image path (PNG)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// TTF/OTF font used for chart text
    #[arg(long)]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "chart size must be between 1 and {} pixels per side, got {width}x{height}",
        MAX_CHART_SIDE
    )]
    ChartSize { width: u32, height: u32 },

    #[error(transparent)]
    Color(#[from] crate::color::UnknownColor),
}

// ---------------------------------------------------------------------------
// Trace naming
// ---------------------------------------------------------------------------

/// How the simulation names its per-socket cwnd traces:
/// `{prefix}-{protocol}-{flows}flows-sock{socket}-cwnd.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceNaming {
    pub prefix: String,
    pub flows: u32,
    pub socket: u32,
}

impl Default for TraceNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            flows: 1,
            socket: 0,
        }
    }
}

impl TraceNaming {
    /// File name for `protocol` (`"TcpCubic"`, `"TcpNewReno"`).
    pub fn file_name(&self, protocol: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}-{}-{}flows-sock{}-cwnd.dat",
            self.prefix, protocol, self.flows, self.socket
        ))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The two trace files being compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    pub cubic: PathBuf,
    pub newreno: PathBuf,
}

impl Inputs {
    pub fn from_naming(naming: &TraceNaming) -> Self {
        Self {
            cubic: naming.file_name("TcpCubic"),
            newreno: naming.file_name("TcpNewReno"),
        }
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Self::from_naming(&TraceNaming::default())
    }
}

/// Look of the rendered figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Font for chart text. When unset, common system locations are searched.
    pub font: Option<PathBuf>,
    pub cubic: SeriesStyle,
    pub newreno: SeriesStyle,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 700,
            title: "Congestion window (cwnd) over time".to_string(),
            font: None,
            cubic: SeriesStyle {
                label: "TCP CUBIC".to_string(),
                color: "green".to_string(),
                marker: Marker::Circle,
            },
            newreno: SeriesStyle {
                label: "TCP NewReno".to_string(),
                color: "yellow".to_string(),
                marker: Marker::TriangleDown,
            },
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit input paths. When absent, they are derived from `naming`.
    pub inputs: Option<Inputs>,
    pub naming: TraceNaming,
    pub output: Option<PathBuf>,
    pub chart: ChartConfig,
}

impl Config {
    /// Build a config from CLI arguments, reading `--config` first if given.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay CLI flags on top of the current values.
    pub fn apply_args(&mut self, args: &CliArgs) {
        let renamed = args.prefix.is_some() || args.flows.is_some() || args.socket.is_some();
        if let Some(prefix) = &args.prefix {
            self.naming.prefix = prefix.clone();
        }
        if let Some(flows) = args.flows {
            self.naming.flows = flows;
        }
        if let Some(socket) = args.socket {
            self.naming.socket = socket;
        }

        let mut inputs = match (&self.inputs, renamed) {
            (Some(inputs), false) => inputs.clone(),
            _ => Inputs::from_naming(&self.naming),
        };
        if let Some(cubic) = &args.cubic {
            inputs.cubic = cubic.clone();
        }
        if let Some(newreno) = &args.newreno {
            inputs.newreno = newreno.clone();
        }
        self.inputs = Some(inputs);

        if let Some(output) = &args.output {
            self.output = Some(output.clone());
        }
        if let Some(width) = args.width {
            self.chart.width = width;
        }
        if let Some(height) = args.height {
            self.chart.height = height;
        }
        if let Some(font) = &args.font {
            self.chart.font = Some(font.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ChartConfig { width, height, .. } = self.chart;
        let side = 1..=MAX_CHART_SIDE;
        if !side.contains(&width) || !side.contains(&height) {
            return Err(ConfigError::ChartSize { width, height });
        }
        crate::color::resolve_color(&self.chart.cubic.color)?;
        crate::color::resolve_color(&self.chart.newreno.color)?;
        Ok(())
    }

    /// Input paths, falling back to the naming scheme.
    pub fn inputs(&self) -> Inputs {
        self.inputs
            .clone()
            .unwrap_or_else(|| Inputs::from_naming(&self.naming))
    }

    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_simulation_output_names() {
        let inputs = Config::default().inputs();
        assert_eq!(
            inputs.cubic,
            PathBuf::from("lab2-part1-ref-TcpCubic-1flows-sock0-cwnd.dat")
        );
        assert_eq!(
            inputs.newreno,
            PathBuf::from("lab2-part1-ref-TcpNewReno-1flows-sock0-cwnd.dat")
        );
        assert_eq!(Config::default().output(), PathBuf::from("graphComparacao.png"));
    }

    #[test]
    fn prefix_flags_rederive_both_inputs() {
        let args = CliArgs::parse_from(["cwnd-plot", "--prefix", "run7", "--flows", "4", "--socket", "2"]);
        let config = Config::from_args(&args).unwrap();
        let inputs = config.inputs();

        assert_eq!(inputs.cubic, PathBuf::from("run7-TcpCubic-4flows-sock2-cwnd.dat"));
        assert_eq!(inputs.newreno, PathBuf::from("run7-TcpNewReno-4flows-sock2-cwnd.dat"));
    }

    #[test]
    fn explicit_paths_win_over_prefix() {
        let args = CliArgs::parse_from([
            "cwnd-plot",
            "--prefix",
            "run7",
            "--cubic",
            "a.dat",
            "-o",
            "out.png",
            "--width",
            "800",
        ]);
        let config = Config::from_args(&args).unwrap();
        let inputs = config.inputs();

        assert_eq!(inputs.cubic, PathBuf::from("a.dat"));
        assert_eq!(inputs.newreno, PathBuf::from("run7-TcpNewReno-1flows-sock0-cwnd.dat"));
        assert_eq!(config.output(), PathBuf::from("out.png"));
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 700);
    }

    #[test]
    fn config_file_is_overlaid_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(
            &path,
            r#"{
                "inputs": { "cubic": "c.dat", "newreno": "n.dat" },
                "output": "from-file.png",
                "chart": { "height": 500, "newreno": { "label": "Reno", "color": "navy", "marker": "square" } }
            }"#,
        )
        .unwrap();

        let args = CliArgs {
            config: Some(path),
            newreno: Some(PathBuf::from("override.dat")),
            ..Default::default()
        };
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.inputs().cubic, PathBuf::from("c.dat"));
        assert_eq!(config.inputs().newreno, PathBuf::from("override.dat"));
        assert_eq!(config.output(), PathBuf::from("from-file.png"));
        assert_eq!(config.chart.width, 1400);
        assert_eq!(config.chart.height, 500);
        assert_eq!(config.chart.newreno.marker, Marker::Square);
        assert_eq!(config.chart.cubic.label, "TCP CUBIC");
    }

    #[test]
    fn bad_colour_and_zero_size_are_rejected() {
        let mut config = Config::default();
        config.chart.cubic.color = "not-a-colour".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Color(_))));

        let mut config = Config::default();
        config.chart.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ChartSize { .. })));
    }

    #[test]
    fn huge_chart_size_is_rejected() {
        let args = CliArgs::parse_from(["cwnd-plot", "--width", "4000000000", "--height", "4000000000"]);
        assert!(matches!(Config::from_args(&args), Err(ConfigError::ChartSize { .. })));

        let mut config = Config::default();
        config.chart.width = MAX_CHART_SIDE;
        config.chart.height = MAX_CHART_SIDE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_config_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse { .. })));
    }
}
