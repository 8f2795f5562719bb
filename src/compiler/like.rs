//! LIKE-family pattern compiler
//!
//! Builds `$regex` fragments for LIKE/ILIKE/STARTSWITH/ENDSWITH/CONTAINS.
//! The literal text is regex-escaped first; SQL wildcard translation
//! (`%` -> any sequence, `_` -> any character) is applied only for the
//! LIKE operators. When no flag forces a regex, the bare literal is
//! returned and equality matching suffices.

use bson::{Bson, Document};

use crate::algebra::{Expr, FieldType};

use super::errors::{CompileError, CompileResult};
use super::expand::{expand, CompileMode};

/// Flags steering the pattern build
#[derive(Debug, Clone, Copy)]
pub struct LikeFlags {
    /// Case-sensitive matching (adds `$options: "i"` when false)
    pub case_sensitive: bool,
    /// Anchor at the start of the value
    pub starts_with: bool,
    /// Anchor at the end of the value
    pub ends_with: bool,
    /// Anchor both ends (element equality on list fields)
    pub whole_string: bool,
    /// Translate SQL `%` and `_` wildcards
    pub like_wildcards: bool,
}

impl Default for LikeFlags {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            starts_with: false,
            ends_with: false,
            whole_string: true,
            like_wildcards: false,
        }
    }
}

/// Compiles a raw text operand into either a bare literal or a
/// `$regex` fragment, per the flags
pub fn build_like_regex(arg: &Expr, flags: LikeFlags, mode: CompileMode) -> CompileResult<Bson> {
    let base = match expand(arg, Some(&FieldType::String), mode)? {
        Bson::String(s) => s,
        other => {
            return Err(CompileError::InvalidQuery(format!(
                "pattern operand must be textual, found {}",
                other
            )))
        }
    };

    let has_wildcards = flags.like_wildcards && (base.contains('%') || base.contains('_'));
    let need_regex = flags.whole_string
        || !flags.case_sensitive
        || flags.starts_with
        || flags.ends_with
        || has_wildcards;
    if !need_regex {
        return Ok(Bson::String(base));
    }

    let mut escaped = regex::escape(&base);
    if flags.like_wildcards {
        escaped = escaped.replace('%', ".*").replace('_', ".");
    }
    let pattern = if flags.starts_with {
        format!("^{}", escaped)
    } else if flags.ends_with {
        format!("{}$", escaped)
    } else if flags.whole_string {
        format!("^{}$", escaped)
    } else {
        escaped
    };

    let mut fragment = Document::new();
    fragment.insert("$regex", pattern);
    if !flags.case_sensitive {
        fragment.insert("$options", "i");
    }
    Ok(Bson::Document(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_of(fragment: &Bson) -> &str {
        match fragment {
            Bson::Document(d) => d.get_str("$regex").unwrap(),
            other => panic!("expected regex fragment, got {:?}", other),
        }
    }

    fn build(text: &str, flags: LikeFlags) -> Bson {
        build_like_regex(&Expr::value(text), flags, CompileMode::Filter).unwrap()
    }

    #[test]
    fn test_like_wildcard_translation() {
        let out = build(
            "a%b_c",
            LikeFlags {
                like_wildcards: true,
                ..LikeFlags::default()
            },
        );
        assert_eq!(pattern_of(&out), "^a.*b.c$");
    }

    #[test]
    fn test_startswith_keeps_wildcards_literal() {
        let out = build(
            "ab%",
            LikeFlags {
                starts_with: true,
                ..LikeFlags::default()
            },
        );
        // starts_with takes precedence over the whole-string anchor and
        // % stays a plain character
        assert_eq!(pattern_of(&out), "^ab%");
    }

    #[test]
    fn test_endswith_anchor() {
        let out = build(
            ".com",
            LikeFlags {
                ends_with: true,
                ..LikeFlags::default()
            },
        );
        assert_eq!(pattern_of(&out), r"\.com$");
    }

    #[test]
    fn test_case_insensitive_option() {
        let out = build(
            "abc",
            LikeFlags {
                case_sensitive: false,
                ..LikeFlags::default()
            },
        );
        match &out {
            Bson::Document(d) => assert_eq!(d.get_str("$options").unwrap(), "i"),
            other => panic!("expected regex fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_metacharacters_escaped_before_wildcards() {
        let out = build(
            "10% (approx)",
            LikeFlags {
                like_wildcards: true,
                ..LikeFlags::default()
            },
        );
        assert_eq!(pattern_of(&out), r"^10.* \(approx\)$");
    }

    #[test]
    fn test_plain_literal_when_no_flag_deviates() {
        let out = build(
            "plain",
            LikeFlags {
                whole_string: false,
                ..LikeFlags::default()
            },
        );
        assert_eq!(out, Bson::String("plain".into()));
    }
}
