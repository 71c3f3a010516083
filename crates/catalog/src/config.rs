use foundation::bounds::Rectangle;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::initial_time::InitialTimeSource;
use crate::interval_index::IntervalIndex;

pub const DEFAULT_OPACITY: f32 = 0.6;

/// Opaque identifier of one imagery source (a layer name, a time parameter,
/// a URL...). Only the viewer interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceToken(pub serde_json::Value);

impl SourceToken {
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl From<&str> for SourceToken {
    fn from(s: &str) -> Self {
        SourceToken(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for SourceToken {
    fn from(s: String) -> Self {
        SourceToken(serde_json::Value::String(s))
    }
}

impl std::fmt::Display for SourceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// One configured interval: `"<ISO8601-start>/<ISO8601-stop>"` plus its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalEntry<T> {
    pub interval: String,
    pub data: T,
}

impl<T> IntervalEntry<T> {
    pub fn new(interval: impl Into<String>, data: T) -> Self {
        Self {
            interval: interval.into(),
            data,
        }
    }
}

/// Catalog-item configuration for a raster imagery layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryItemConfig {
    #[serde(default)]
    pub name: String,
    /// Source used when the item declares no intervals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceToken>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<IntervalEntry<SourceToken>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_time_source: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangle: Option<Rectangle>,
    #[serde(default = "default_true")]
    pub clip_to_rectangle: bool,
    #[serde(default = "default_true")]
    pub is_shown: bool,
}

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}

fn default_true() -> bool {
    true
}

impl ImageryItemConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            intervals: Vec::new(),
            initial_time_source: None,
            opacity: DEFAULT_OPACITY,
            rectangle: None,
            clip_to_rectangle: true,
            is_shown: true,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn is_time_dynamic(&self) -> bool {
        !self.intervals.is_empty()
    }

    /// `None` when the item declares no intervals.
    pub fn interval_index(&self) -> Result<Option<IntervalIndex<SourceToken>>, ConfigurationError> {
        if !self.is_time_dynamic() {
            return Ok(None);
        }
        IntervalIndex::from_configuration(&self.intervals).map(Some)
    }

    pub fn initial_time_source(&self) -> Result<InitialTimeSource, ConfigurationError> {
        InitialTimeSource::parse(self.initial_time_source.as_deref())
    }
}
