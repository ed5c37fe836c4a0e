//! Codes for all mandatory-pass diagnostics.
//!
//! The letter gives the severity class and the first digit the phase:
//! - W4xxx: mandatory diagnostic pass warnings
//! - E9xxx: internal compiler errors

use std::fmt;

/// Diagnostic codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Mandatory Pass Warnings (W4xxx)
    /// Function call causes an infinite recursion
    W4001,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    ///
    /// When adding a new variant: add it to the enum, `as_str()`, and here.
    pub const ALL: &[ErrorCode] = &[ErrorCode::W4001, ErrorCode::E9001];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W4001 => "W4001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is an internal compiler error.
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }

    /// Check if this code is a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W4001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a code string like `"W4001"` (case-insensitive).
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
