//! Application constants for the delimited validator
//!
//! Field positions, rule limits and the punctuation each configuration
//! parameter may take.

// =============================================================================
// Field Layout
// =============================================================================

/// Number of semantic columns every data row is expected to carry
pub const EXPECTED_FIELD_COUNT: usize = 4;

/// Column positions within a row
pub mod positions {
    pub const NAME: usize = 0;
    pub const AGE: usize = 1;
    pub const PROFESSION: usize = 2;
    pub const GENDER: usize = 3;
}

/// Column names in positional order, used for reports and JSON output
pub const FIELD_NAMES: [&str; 4] = ["name", "age", "profession", "gender"];

// =============================================================================
// Validation Limits
// =============================================================================

/// Maximum length in characters of free-text fields (name, profession)
pub const MAX_TEXT_FIELD_LENGTH: usize = 50;

/// Inclusive age bounds
pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 75;

/// Accepted gender values after lowercasing
pub const GENDER_VALUES: &[&str] = &["male", "female"];

// =============================================================================
// Configuration Parameters
// =============================================================================

/// Configuration keys as they appear in the configuration file, in the
/// order the configuration gate checks them
pub mod config_keys {
    pub const DELIMITER: &str = "delimiter";
    pub const HAS_HEADERS: &str = "hasHeaders";
    pub const SEPARATOR: &str = "separator";
    pub const TERMINATOR: &str = "terminator";
}

/// Characters accepted as the field delimiter (quote)
pub const ALLOWED_DELIMITERS: &[char] = &['"', '\''];

/// Characters accepted as the field separator
pub const ALLOWED_SEPARATORS: &[char] = &[',', ';', '|'];

/// Characters accepted as the row terminator
pub const ALLOWED_TERMINATORS: &[char] = &['\n'];

// =============================================================================
// Process Exit Codes
// =============================================================================

pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    /// Reserved for clap's own usage errors
    pub const USAGE: u8 = 2;
    pub const CONFIGURATION: u8 = 3;
    pub const IO: u8 = 4;
    pub const SYNTAX: u8 = 5;
    pub const VALIDATION: u8 = 6;
}
