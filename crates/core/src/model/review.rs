use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when decoding a grade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GradeError {
    #[error("unknown grade: {0:?}")]
    Unknown(String),
}

//
// ─── GRADE ────────────────────────────────────────────────────────────────────
//

/// Binary self-assessment given after the answer is revealed.
///
/// - `Pass`: recalled the answer; the card backs off.
/// - `Fail`: did not recall; the card comes back soon and gains urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Pass,
    Fail,
}

impl Grade {
    /// Storage representation: `"pass"` or `"fail"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Pass => "pass",
            Grade::Fail => "fail",
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Grade::Pass)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(Grade::Pass),
            "fail" => Ok(Grade::Fail),
            other => Err(GradeError::Unknown(other.to_owned())),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parses_storage_encoding() {
        assert_eq!("pass".parse::<Grade>().unwrap(), Grade::Pass);
        assert_eq!(" FAIL ".parse::<Grade>().unwrap(), Grade::Fail);
        let err = "again".parse::<Grade>().unwrap_err();
        assert!(matches!(err, GradeError::Unknown(s) if s == "again"));
    }

    #[test]
    fn grade_display_matches_as_str() {
        assert_eq!(Grade::Pass.to_string(), "pass");
        assert_eq!(Grade::Fail.to_string(), Grade::Fail.as_str());
    }
}
