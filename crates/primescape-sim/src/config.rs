use std::fs;
use std::path::{Path, PathBuf};

use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::{Property, Rounding};
use primescape_decomp::FamilyScheme;
use primescape_palette::Palette;
use primescape_store::DEFAULT_BATCH_LIMIT;
use serde::{Deserialize, Serialize};

use crate::serde::{from_yaml_slice, to_yaml_string};

/// YAML-configurable parameters governing one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunConfig {
    /// Which integers are analysed.
    #[serde(default)]
    pub range: RangeConfig,
    /// Family generation scheme used in `families` mode.
    #[serde(default)]
    pub families: FamilyScheme,
    /// Execution and output switches.
    #[serde(default)]
    pub run: RunSection,
    /// Plot payload settings.
    #[serde(default)]
    pub graph: GraphConfig,
    /// Optional record cache.
    #[serde(default)]
    pub store: StoreConfig,
}

/// How the value list is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// Every integer between the bounds.
    #[default]
    Continuous,
    /// Members of the configured division families.
    Families,
}

/// Value range selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Generation mode.
    #[serde(default)]
    pub mode: RangeMode,
    /// Inclusive lower bound for continuous mode.
    #[serde(default = "default_lower_bound")]
    pub lower_bound: u64,
    /// Inclusive upper bound for continuous mode.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: u64,
    /// When non-empty, only values from these division families are kept.
    #[serde(default)]
    pub families_filter: Vec<u64>,
}

fn default_lower_bound() -> u64 {
    2
}

fn default_upper_bound() -> u64 {
    10
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            mode: RangeMode::Continuous,
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            families_filter: Vec::new(),
        }
    }
}

/// Execution switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSection {
    /// Keep prime values in the analysis.
    #[serde(default)]
    pub include_primes: bool,
    /// Worker count; `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Write the CSV hard copy.
    #[serde(default = "default_true")]
    pub create_csv: bool,
    /// Write the JSON plot payload.
    #[serde(default = "default_true")]
    pub create_json: bool,
    /// Directory receiving hard copies.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Remove existing files from the output directory first.
    #[serde(default)]
    pub reset_output_data: bool,
    /// 0 = date, 1 = +hour, 2 = +minute, 3 = +second.
    #[serde(default)]
    pub timestamp_granularity: u8,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            include_primes: false,
            workers: None,
            create_csv: true,
            create_json: true,
            output_dir: default_output_dir(),
            reset_output_data: false,
            timestamp_granularity: 0,
        }
    }
}

/// Statistic plotted on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    /// `value / mean_deviation`.
    #[default]
    Antislope,
    /// Mean prime factor deviation.
    MeanDeviation,
    /// Ideal prime factor.
    IdealFactor,
}

impl GraphMode {
    /// Name used in file stems.
    pub fn name(&self) -> &'static str {
        match self {
            GraphMode::Antislope => "antislope",
            GraphMode::MeanDeviation => "mean_deviation",
            GraphMode::IdealFactor => "ideal_factor",
        }
    }

    /// Plot title for the analysed span.
    pub fn title(&self, first: u64, last: u64, include_primes: bool) -> String {
        let head = match self {
            GraphMode::Antislope => format!("Antislope for numbers {first} to {last}."),
            GraphMode::MeanDeviation => {
                format!("Mean prime factor deviations for numbers {first} to {last}.")
            }
            GraphMode::IdealFactor => format!("Ideal prime factor for numbers {first} to {last}."),
        };
        let primes = if include_primes {
            " Primes included"
        } else {
            " Primes excluded"
        };
        format!("{head}{primes}")
    }

    /// Human readable y axis label.
    pub fn y_axis_label(&self) -> &'static str {
        match self {
            GraphMode::Antislope => "antislope",
            GraphMode::MeanDeviation => "mean prime factor deviation",
            GraphMode::IdealFactor => "ideal prime factor",
        }
    }

    /// Row field holding the y value.
    pub fn y_axis_field(&self) -> &'static str {
        match self {
            GraphMode::Antislope => "antislope",
            GraphMode::MeanDeviation => "deviation",
            GraphMode::IdealFactor => "ideal",
        }
    }
}

/// Plot payload settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Y axis statistic.
    #[serde(default)]
    pub mode: GraphMode,
    /// Colour points by palette bucket instead of a single base colour.
    #[serde(default = "default_true")]
    pub use_color_buckets: bool,
    /// Record property driving the colour buckets.
    #[serde(default = "default_color_property")]
    pub color_property: String,
    /// Discretisation applied to the colour property.
    #[serde(default)]
    pub rounding: Rounding,
    /// Palette name; unknown names resolve to Turbo.
    #[serde(default = "default_palette")]
    pub palette: String,
    /// Plot width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Plot height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Scatter point size.
    #[serde(default = "default_point_size")]
    pub point_size: u32,
}

fn default_color_property() -> String {
    Property::Antislope.name().to_string()
}

fn default_palette() -> String {
    Palette::Turbo.name().to_string()
}

fn default_width() -> u32 {
    1600
}

fn default_height() -> u32 {
    900
}

fn default_point_size() -> u32 {
    3
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            mode: GraphMode::default(),
            use_color_buckets: true,
            color_property: default_color_property(),
            rounding: Rounding::default(),
            palette: default_palette(),
            width: default_width(),
            height: default_height(),
            point_size: default_point_size(),
        }
    }
}

impl GraphConfig {
    /// Resolved palette.
    pub fn palette(&self) -> Palette {
        Palette::from_name(&self.palette)
    }
}

/// Record cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path; `None` disables persistence.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Values per load query.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
}

fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            batch_limit: default_batch_limit(),
        }
    }
}

impl RunConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, ScapeError> {
        let config: RunConfig = from_yaml_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ScapeError> {
        to_yaml_string(self)
    }

    /// Rejects settings that would fail mid-run.
    pub fn validate(&self) -> Result<(), ScapeError> {
        match self.range.mode {
            RangeMode::Continuous => {
                if self.range.lower_bound < 1 {
                    return Err(config_error("config.lower_bound", "lower_bound must be at least 1")
                        .map_info(|info| info.with_context("lower_bound", self.range.lower_bound)));
                }
                if self.range.lower_bound > self.range.upper_bound {
                    return Err(config_error(
                        "config.bounds",
                        "lower_bound exceeds upper_bound",
                    )
                    .map_info(|info| {
                        info.with_context("lower_bound", self.range.lower_bound)
                            .with_context("upper_bound", self.range.upper_bound)
                    }));
                }
            }
            RangeMode::Families => {
                if self.families.families.is_empty() {
                    return Err(config_error(
                        "config.families",
                        "families mode needs at least one family",
                    ));
                }
                self.families.validate()?;
            }
        }
        if self.run.timestamp_granularity > 3 {
            return Err(config_error(
                "config.timestamp_granularity",
                "timestamp_granularity must be between 0 and 3",
            )
            .map_info(|info| info.with_context("value", self.run.timestamp_granularity)));
        }
        if self.run.workers == Some(0) {
            return Err(config_error("config.workers", "workers must be at least 1"));
        }
        if self.store.batch_limit == 0 {
            return Err(config_error("config.batch_limit", "batch_limit must be at least 1"));
        }
        self.graph.color_property.parse::<Property>()?;
        Ok(())
    }

    /// Property driving colour buckets.
    pub fn color_property(&self) -> Result<Property, ScapeError> {
        self.graph.color_property.parse()
    }
}

fn config_error(code: &str, message: &str) -> ScapeError {
    ScapeError::InvalidInput(ErrorInfo::new(code, message))
}

/// Reads and validates a YAML configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig, ScapeError> {
    let bytes = fs::read(path).map_err(|err| {
        ScapeError::Serde(
            ErrorInfo::new("sim.config_read", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    RunConfig::from_yaml_slice(&bytes)
}
