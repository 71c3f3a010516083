use foundation::time::SpanParseError;

/// Catalog configuration that cannot be turned into a consistent item.
///
/// Raised at load time; callers must not build a time-dynamic item from a
/// configuration that produced one of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid time interval `{value}`: {reason}")]
    InvalidInterval {
        value: String,
        reason: SpanParseError,
    },

    #[error("invalid initialTimeSource `{value}`: expected present, start, end or an ISO8601 time")]
    InvalidInitialTime { value: String },

    #[error("catalog item `{name}` has neither time intervals nor a source")]
    MissingSource { name: String },

    #[error("malformed catalog item: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::ConfigurationError;
    use foundation::time::SpanParseError;

    #[test]
    fn messages_name_the_offending_value() {
        let e = ConfigurationError::InvalidInterval {
            value: "not-a-date/2020".to_string(),
            reason: SpanParseError::InvalidStart("not-a-date".to_string()),
        };
        let msg = e.to_string();
        assert!(msg.contains("not-a-date/2020"), "{msg}");
        assert!(msg.contains("unparsable start"), "{msg}");

        let e = ConfigurationError::InvalidInitialTime {
            value: "yesterday".to_string(),
        };
        assert!(e.to_string().contains("`yesterday`"));
    }
}
