//! Domain error types.

/// Top-level error type for barscan.
///
/// Data-quality conditions (short history, missing optional columns,
/// malformed OHLC values) are deliberately not represented here: they
/// degrade to NaN indicators and false signals instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum BarscanError {
    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no rules selected")]
    NoRulesSelected,

    #[error("instrument list unreadable: {reason}")]
    InstrumentList { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BarscanError> for std::process::ExitCode {
    fn from(err: &BarscanError) -> Self {
        let code: u8 = match err {
            BarscanError::Io(_) => 1,
            BarscanError::ConfigParse { .. }
            | BarscanError::ConfigMissing { .. }
            | BarscanError::ConfigInvalid { .. }
            | BarscanError::NoRulesSelected => 2,
            BarscanError::Store { .. } | BarscanError::InstrumentList { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = BarscanError::ConfigInvalid {
            section: "scan".into(),
            key: "start_date".into(),
            reason: "expected YYYY-MM-DD".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [scan] start_date: expected YYYY-MM-DD"
        );

        let err = BarscanError::Store {
            reason: "truncated file".into(),
        };
        assert_eq!(err.to_string(), "store error: truncated file");
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io: BarscanError = std::io::Error::other("boom").into();
        assert_eq!(io.to_string(), "boom");
    }
}
