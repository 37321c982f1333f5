//! Line annotation parsing.
//!
//! Attribute values arrive as strings. Only plain decimal integers are
//! accepted: surrounding ASCII whitespace is trimmed, then the remainder must
//! be one or more ASCII digits that fit a `u32`. Signs, fractions, exponents
//! and hex are rejected so the same markup always yields the same map.

use thiserror::Error;

/// Attribute the renderer uses to tag elements with their source line.
pub const DEFAULT_LINE_ATTRIBUTE: &str = "data-line";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("empty line annotation")]
    Empty,
    #[error("invalid line annotation {raw:?}")]
    Invalid { raw: String },
}

pub fn parse_line_annotation(raw: &str) -> Result<u32, AnnotationError> {
    let trimmed = raw.trim_ascii();
    if trimmed.is_empty() {
        return Err(AnnotationError::Empty);
    }
    // `u32::from_str` tolerates a leading '+', which we don't.
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnnotationError::Invalid {
            raw: raw.to_string(),
        });
    }
    trimmed.parse::<u32>().map_err(|_| AnnotationError::Invalid {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_decimal() {
        assert_eq!(parse_line_annotation("0"), Ok(0));
        assert_eq!(parse_line_annotation("42"), Ok(42));
        assert_eq!(parse_line_annotation("007"), Ok(7));
        assert_eq!(parse_line_annotation(" 12\n"), Ok(12));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(parse_line_annotation(""), Err(AnnotationError::Empty));
        assert_eq!(parse_line_annotation("   "), Err(AnnotationError::Empty));
    }

    #[test]
    fn rejects_non_decimal() {
        for raw in ["+5", "-1", "1.5", "1e3", "0x10", "ten", "1 2", "4294967296"] {
            assert!(
                matches!(parse_line_annotation(raw), Err(AnnotationError::Invalid { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn error_message_includes_raw_value() {
        let err = parse_line_annotation("abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid line annotation \"abc\"");
    }

    proptest! {
        #[test]
        fn agrees_with_decimal_formatting(n in any::<u32>()) {
            prop_assert_eq!(parse_line_annotation(&n.to_string()), Ok(n));
        }
    }
}
