//! Instrument universe: the set of ids a scan fans out over.

use std::collections::HashSet;

/// One scannable instrument: warehouse id plus display name.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub code: String,
    pub name: String,
}

impl Instrument {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

/// Parse a comma-separated code list into instruments (display name
/// defaults to the code). Used by the CLI `--codes` override; the full
/// universe normally comes from the warehouse instrument list.
pub fn parse_codes(input: &str) -> Result<Vec<Instrument>, UniverseError> {
    let mut instruments = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if seen.contains(&code) {
            return Err(UniverseError::DuplicateCode(code));
        }
        seen.insert(code.clone());
        instruments.push(Instrument::new(code.clone(), code));
    }

    Ok(instruments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_basic() {
        let result = parse_codes("600000,000001,300750").unwrap();
        let codes: Vec<&str> = result.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["600000", "000001", "300750"]);
    }

    #[test]
    fn parse_codes_trims_and_uppercases() {
        let result = parse_codes(" 600000 , sh600519 ").unwrap();
        assert_eq!(result[1].code, "SH600519");
    }

    #[test]
    fn parse_codes_rejects_empty_token() {
        assert!(matches!(
            parse_codes("600000,,000001"),
            Err(UniverseError::EmptyToken)
        ));
    }

    #[test]
    fn parse_codes_rejects_duplicates() {
        assert!(matches!(
            parse_codes("600000,000001,600000"),
            Err(UniverseError::DuplicateCode(c)) if c == "600000"
        ));
    }

    #[test]
    fn display_name_defaults_to_code() {
        let result = parse_codes("600000").unwrap();
        assert_eq!(result[0].name, "600000");
    }
}
