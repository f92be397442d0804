// chirp-gate-mcp/src/validation.rs
// ============================================================================
// Module: Tool Parameter Validation
// Description: Bounds and enumeration checks for tool arguments.
// Purpose: Reject invalid tool arguments before any platform call.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Count-style tool parameters arrive as strings and must land in `1..=50`;
//! enumerated parameters must match a fixed literal set. Every check here
//! runs before the router builds a platform session, so invalid input never
//! reaches the external platform. All checks are pure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum accepted count value.
pub const MIN_COUNT: i64 = 1;
/// Maximum accepted count value.
pub const MAX_COUNT: i64 = 50;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Parses and bounds-checks a count-style parameter.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value does not parse as an integer
/// or falls outside `1..=50`.
pub fn bounded_count(param: &'static str, raw: &str) -> Result<usize, ValidationError> {
    let value: i64 = raw.trim().parse().map_err(|_| ValidationError::NotANumber {
        param,
    })?;
    if value > MAX_COUNT {
        return Err(ValidationError::TooLarge {
            param,
        });
    }
    if value < MIN_COUNT {
        return Err(ValidationError::TooSmall {
            param,
        });
    }
    usize::try_from(value).map_err(|_| ValidationError::NotANumber {
        param,
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool argument validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value does not parse as an integer.
    #[error("invalid argument ({param}): not a number")]
    NotANumber {
        /// Offending parameter name.
        param: &'static str,
    },
    /// The value is zero or negative.
    #[error("invalid argument ({param}): must be greater than zero")]
    TooSmall {
        /// Offending parameter name.
        param: &'static str,
    },
    /// The value exceeds the maximum.
    #[error("invalid argument ({param}): max value is 50")]
    TooLarge {
        /// Offending parameter name.
        param: &'static str,
    },
    /// The value is not in the fixed literal set.
    #[error("invalid argument ({param}): must be one of {allowed}")]
    InvalidChoice {
        /// Offending parameter name.
        param: &'static str,
        /// Comma-separated allowed literals.
        allowed: String,
    },
}

impl ValidationError {
    /// Builds an [`ValidationError::InvalidChoice`] from the allowed set.
    #[must_use]
    pub fn invalid_choice(param: &'static str, allowed: &[&str]) -> Self {
        Self::InvalidChoice {
            param,
            allowed: allowed.join(", "),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions."
    )]

    use proptest::prelude::proptest;

    use super::ValidationError;
    use super::bounded_count;

    #[test]
    fn accepts_bounds() {
        assert_eq!(bounded_count("count", "1"), Ok(1));
        assert_eq!(bounded_count("count", "50"), Ok(50));
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(
            bounded_count("count", "0"),
            Err(ValidationError::TooSmall {
                param: "count"
            })
        );
    }

    #[test]
    fn rejects_negative() {
        assert_eq!(
            bounded_count("count", "-3"),
            Err(ValidationError::TooSmall {
                param: "count"
            })
        );
    }

    #[test]
    fn rejects_above_max() {
        assert_eq!(
            bounded_count("count", "51"),
            Err(ValidationError::TooLarge {
                param: "count"
            })
        );
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(
            bounded_count("count", "thirty"),
            Err(ValidationError::NotANumber {
                param: "count"
            })
        );
    }

    #[test]
    fn invalid_choice_lists_allowed_literals() {
        let error = ValidationError::invalid_choice("action", &["like", "unlike"]);
        assert_eq!(error.to_string(), "invalid argument (action): must be one of like, unlike");
    }

    proptest! {
        #[test]
        fn accepts_every_count_in_range(count in 1_i64..=50) {
            let parsed = bounded_count("count", &count.to_string()).expect("in range");
            assert_eq!(parsed, usize::try_from(count).expect("non-negative"));
        }

        #[test]
        fn rejects_every_count_out_of_range(count in proptest::prelude::prop_oneof![
            i64::MIN..=0,
            51_i64..=i64::MAX,
        ]) {
            assert!(bounded_count("count", &count.to_string()).is_err());
        }
    }
}
