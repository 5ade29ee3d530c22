//! Field predicates, rule sets and validation errors.

use super::FormInput;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{7,18}[0-9]$").expect("valid phone regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

/// One predicate applied to a trimmed field value.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    Required,
    /// Minimum length in characters.
    MinLength(usize),
    /// Maximum length in characters.
    MaxLength(usize),
    Email,
    Phone,
    /// Custom pattern; `hint` completes the sentence "<label> must ...".
    Pattern {
        regex: &'static Lazy<Regex>,
        hint: &'static str,
    },
    Decimal {
        min: Option<f64>,
        max: Option<f64>,
    },
    Integer { min: i64, max: i64 },
    /// `YYYY-MM-DD`.
    Date,
    /// `YYYY-MM-DD`, not before today.
    DateNotInPast,
    /// `HH:MM`, 24-hour.
    Time,
    OneOf(&'static [&'static str]),
}

/// Checks for one form field, evaluated in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    /// Human-readable field name used in messages.
    pub label: &'static str,
    pub checks: &'static [Check],
}

impl FieldRule {
    pub fn is_required(&self) -> bool {
        self.checks
            .iter()
            .any(|check| matches!(check, Check::Required))
    }
}

/// Ordered rule list for one entity form.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    rules: &'static [FieldRule],
}

impl RuleSet {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    pub fn rule(&self, field: &str) -> Option<&'static FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    /// Validates a complete submission.
    ///
    /// Every rule is evaluated against the submitted value (missing fields
    /// count as empty). Fields without a rule are rejected.
    pub fn validate(&self, form: &FormInput, today: NaiveDate) -> Result<(), ValidationError> {
        self.reject_unknown_fields(form)?;
        for rule in self.rules {
            check_field(rule, form.get(rule.field).unwrap_or_default(), today)?;
        }
        Ok(())
    }

    /// Validates only the fields a partial update names.
    pub fn validate_patch(
        &self,
        patch: &FormInput,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        self.reject_unknown_fields(patch)?;
        for rule in self.rules {
            if let Some(value) = patch.get(rule.field) {
                check_field(rule, value, today)?;
            }
        }
        Ok(())
    }

    fn reject_unknown_fields(&self, form: &FormInput) -> Result<(), ValidationError> {
        match form.fields().find(|(name, _)| self.rule(name).is_none()) {
            Some((name, _)) => Err(ValidationError::new(
                name,
                ValidationCode::UnknownField,
                format!("{name} is not an editable field"),
            )),
            None => Ok(()),
        }
    }
}

/// Applies one rule to one raw value.
///
/// Blank values of optional fields pass without running any other check.
pub fn check_field(rule: &FieldRule, raw: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        if rule.is_required() {
            return Err(fail(rule, ValidationCode::Required, "is required".to_string()));
        }
        return Ok(());
    }

    for check in rule.checks {
        match *check {
            Check::Required => {}
            Check::MinLength(min) => {
                if value.chars().count() < min {
                    return Err(fail(
                        rule,
                        ValidationCode::TooShort,
                        format!("must be at least {min} characters"),
                    ));
                }
            }
            Check::MaxLength(max) => {
                if value.chars().count() > max {
                    return Err(fail(
                        rule,
                        ValidationCode::TooLong,
                        format!("must be at most {max} characters"),
                    ));
                }
            }
            Check::Email => {
                if !EMAIL_RE.is_match(value) {
                    return Err(fail(
                        rule,
                        ValidationCode::InvalidEmail,
                        "must be a valid email address".to_string(),
                    ));
                }
            }
            Check::Phone => {
                if !PHONE_RE.is_match(value) {
                    return Err(fail(
                        rule,
                        ValidationCode::InvalidPhone,
                        "must be a valid phone number".to_string(),
                    ));
                }
            }
            Check::Pattern { regex, hint } => {
                if !regex.is_match(value) {
                    return Err(fail(
                        rule,
                        ValidationCode::PatternMismatch,
                        format!("must {hint}"),
                    ));
                }
            }
            Check::Decimal { min, max } => {
                let number = match value.parse::<f64>() {
                    Ok(number) if number.is_finite() => number,
                    _ => {
                        return Err(fail(
                            rule,
                            ValidationCode::NotANumber,
                            "must be a number".to_string(),
                        ))
                    }
                };
                if let Some(min) = min {
                    if number < min {
                        return Err(fail(
                            rule,
                            ValidationCode::BelowMinimum,
                            format!("must be at least {min}"),
                        ));
                    }
                }
                if let Some(max) = max {
                    if number > max {
                        return Err(fail(
                            rule,
                            ValidationCode::AboveMaximum,
                            format!("must be at most {max}"),
                        ));
                    }
                }
            }
            Check::Integer { min, max } => {
                let Ok(number) = value.parse::<i64>() else {
                    return Err(fail(
                        rule,
                        ValidationCode::NotANumber,
                        "must be a whole number".to_string(),
                    ));
                };
                if number < min {
                    return Err(fail(
                        rule,
                        ValidationCode::BelowMinimum,
                        format!("must be at least {min}"),
                    ));
                }
                if number > max {
                    return Err(fail(
                        rule,
                        ValidationCode::AboveMaximum,
                        format!("must be at most {max}"),
                    ));
                }
            }
            Check::Date | Check::DateNotInPast => {
                let Some(date) = parse_date(value) else {
                    return Err(fail(
                        rule,
                        ValidationCode::InvalidDate,
                        "must be a date in YYYY-MM-DD format".to_string(),
                    ));
                };
                if matches!(check, Check::DateNotInPast) && date < today {
                    return Err(fail(
                        rule,
                        ValidationCode::DateInPast,
                        "cannot be in the past".to_string(),
                    ));
                }
            }
            Check::Time => {
                if parse_time(value).is_none() {
                    return Err(fail(
                        rule,
                        ValidationCode::InvalidTime,
                        "must be a time in HH:MM format".to_string(),
                    ));
                }
            }
            Check::OneOf(allowed) => {
                if !allowed.contains(&value) {
                    return Err(fail(
                        rule,
                        ValidationCode::NotAllowed,
                        format!("must be one of: {}", allowed.join(", ")),
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a strict `HH:MM` clock time.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if !TIME_RE.is_match(value) {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn fail(rule: &FieldRule, code: ValidationCode, tail: String) -> ValidationError {
    ValidationError::new(rule.field, code, format!("{} {tail}", rule.label))
}

/// Machine-readable reason a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    Required,
    TooShort,
    TooLong,
    InvalidEmail,
    InvalidPhone,
    PatternMismatch,
    NotANumber,
    BelowMinimum,
    AboveMaximum,
    InvalidDate,
    DateInPast,
    InvalidTime,
    NotAllowed,
    UnknownField,
    /// Value is well-formed but points at a record that does not exist.
    UnknownReference,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone => "invalid_phone",
            Self::PatternMismatch => "pattern_mismatch",
            Self::NotANumber => "not_a_number",
            Self::BelowMinimum => "below_minimum",
            Self::AboveMaximum => "above_maximum",
            Self::InvalidDate => "invalid_date",
            Self::DateInPast => "date_in_past",
            Self::InvalidTime => "invalid_time",
            Self::NotAllowed => "not_allowed",
            Self::UnknownField => "unknown_field",
            Self::UnknownReference => "unknown_reference",
        }
    }
}

/// First failing field of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    /// User-facing sentence, e.g. "Contact phone must be at least 9 characters".
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ValidationError {}
