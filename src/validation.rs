//! Field constraints checked once at the request boundary.
//!
//! Each request type declares a table of [`FieldRule`]s next to its fields and
//! runs [`validate`] over `(rule, value)` pairs. All violations are collected
//! so the caller can report them together.

use std::fmt;

use warp::reject::Reject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub max_len: Option<usize>,
}

impl FieldRule {
    /// Must be present and not blank.
    pub const fn required(field: &'static str) -> Self {
        Self {
            field,
            required: true,
            max_len: None,
        }
    }

    pub const fn optional(field: &'static str) -> Self {
        Self {
            field,
            required: false,
            max_len: None,
        }
    }

    /// Upper bound in characters, not bytes.
    pub const fn max_len(self, max: usize) -> Self {
        Self {
            max_len: Some(max),
            ..self
        }
    }

    fn check(&self, value: Option<&str>) -> Option<ViolationKind> {
        match value {
            None => self.required.then_some(ViolationKind::Missing),
            Some(v) if self.required && v.trim().is_empty() => Some(ViolationKind::Missing),
            Some(v) => match self.max_len {
                Some(max) if v.chars().count() > max => Some(ViolationKind::TooLong { max }),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    TooLong { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Missing => write!(f, "{} is required", self.field),
            ViolationKind::TooLong { max } => {
                write!(f, "{} must not exceed {max} characters", self.field)
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid request: {}", join(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl Reject for ValidationError {}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn validate(fields: &[(FieldRule, Option<&str>)]) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = fields
        .iter()
        .filter_map(|(rule, value)| {
            rule.check(*value).map(|kind| Violation {
                field: rule.field,
                kind,
            })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME_EN: FieldRule = FieldRule::required("nameEn").max_len(5);
    const ICON_URL: FieldRule = FieldRule::optional("iconUrl").max_len(10);

    #[test]
    fn accepts_values_within_limits() {
        assert_eq!(validate(&[(NAME_EN, Some("Rust")), (ICON_URL, None)]), Ok(()));
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(validate(&[(NAME_EN, Some("ñññññ"))]), Ok(()));
    }

    #[test]
    fn reports_every_violation() {
        let err = validate(&[(NAME_EN, Some("  ")), (ICON_URL, Some("https://x.io/a.svg"))])
            .unwrap_err();

        assert_eq!(
            err.violations,
            vec![
                Violation {
                    field: "nameEn",
                    kind: ViolationKind::Missing
                },
                Violation {
                    field: "iconUrl",
                    kind: ViolationKind::TooLong { max: 10 }
                },
            ]
        );
        assert_eq!(
            err.to_string(),
            "invalid request: nameEn is required, iconUrl must not exceed 10 characters"
        );
    }

    #[test]
    fn optional_field_may_be_absent_or_blank() {
        assert_eq!(validate(&[(ICON_URL, None), (ICON_URL, Some(""))]), Ok(()));
    }
}
