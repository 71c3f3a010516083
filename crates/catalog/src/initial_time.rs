use foundation::time::{Time, TimeSpan};

use crate::error::ConfigurationError;

/// Where playback starts when a time-dynamic item is first enabled.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum InitialTimeSource {
    /// Wall-clock now, clamped into the item's bounds.
    #[default]
    Present,
    Start,
    End,
    /// An explicit instant, clamped into the item's bounds.
    Literal(Time),
}

impl InitialTimeSource {
    /// `None` means `Present`. Keywords are case-insensitive.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigurationError> {
        let Some(raw) = raw else {
            return Ok(Self::Present);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            _ => Time::parse_iso8601(raw)
                .map(Self::Literal)
                .ok_or_else(|| ConfigurationError::InvalidInitialTime {
                    value: raw.to_string(),
                }),
        }
    }

    pub fn resolve(self, bounds: TimeSpan, now: Time) -> Time {
        match self {
            Self::Present => bounds.clamp(now),
            Self::Start => bounds.start,
            Self::End => bounds.stop,
            Self::Literal(t) => bounds.clamp(t),
        }
    }
}
