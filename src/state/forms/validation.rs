//! Field validation rules
//!
//! Every function here is pure: the failures for a field depend only on
//! that field's current value and are recomputed on each read.

use super::field::Field;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const REQUIRED_MESSAGE: &str = "this field is required";
pub const USERNAME_FORMAT_MESSAGE: &str = "must contain only letters and numbers";
pub const USERNAME_LENGTH_MESSAGE: &str = "must be between 3 and 20 characters";
pub const EMAIL_MESSAGE: &str = "must be a valid email address";

/// Inclusive username length bounds
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("username pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

/// Closed set of failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Required,
    UsernameInvalid,
    Email,
    /// Remote rejection
    Server,
}

impl FailureKind {
    /// Display priority, lower wins
    pub fn priority(self) -> u8 {
        match self {
            Self::Required => 0,
            Self::UsernameInvalid | Self::Email => 1,
            Self::Server => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn required() -> Self {
        Self::new(FailureKind::Required, REQUIRED_MESSAGE)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Server, message)
    }
}

/// A failure aimed at a specific field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub field: Field,
    #[serde(flatten)]
    pub failure: ValidationFailure,
}

impl FieldFailure {
    pub fn new(field: Field, failure: ValidationFailure) -> Self {
        Self { field, failure }
    }
}

pub fn validate_required(value: &str) -> Vec<ValidationFailure> {
    if value.is_empty() {
        vec![ValidationFailure::required()]
    } else {
        Vec::new()
    }
}

/// Format is checked before length; only the first failing rule is reported.
/// Empty values pass, emptiness belongs to [`validate_required`].
pub fn validate_username(value: &str) -> Vec<ValidationFailure> {
    if value.is_empty() {
        return Vec::new();
    }
    if !USERNAME_PATTERN.is_match(value) {
        return vec![ValidationFailure::new(
            FailureKind::UsernameInvalid,
            USERNAME_FORMAT_MESSAGE,
        )];
    }
    // ASCII only past this point, so bytes == chars
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&value.len()) {
        return vec![ValidationFailure::new(
            FailureKind::UsernameInvalid,
            USERNAME_LENGTH_MESSAGE,
        )];
    }
    Vec::new()
}

pub fn validate_email(value: &str) -> Vec<ValidationFailure> {
    if value.is_empty() || EMAIL_PATTERN.is_match(value) {
        Vec::new()
    } else {
        vec![ValidationFailure::new(FailureKind::Email, EMAIL_MESSAGE)]
    }
}

/// Merged output of the required check and the field's own validator
pub fn field_failures(field: Field, value: &str) -> Vec<ValidationFailure> {
    let mut failures = validate_required(value);
    failures.extend(match field {
        Field::Username => validate_username(value),
        Field::Email => validate_email(value),
    });
    failures
}

/// Pick the message to display: highest-priority kind first, ties keep
/// list order. Empty string when there is nothing to show.
pub fn select_message(failures: &[ValidationFailure]) -> &str {
    failures
        .iter()
        .enumerate()
        .min_by_key(|(index, failure)| (failure.kind.priority(), *index))
        .map(|(_, failure)| failure.message.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(failures: &[ValidationFailure]) -> Vec<FailureKind> {
        failures.iter().map(|f| f.kind).collect()
    }

    mod username {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_alphanumeric_within_bounds_passes() {
            for value in ["abc", "validUser1", "A1b2C3", "abcdefghijklmnopqrst"] {
                assert!(validate_username(value).is_empty(), "{value}");
            }
        }

        #[test]
        fn test_non_alphanumeric_reports_format_once() {
            for value in ["ab$", "a b", "user_name", "x-", "héllo", "$", "abcdefghijklmnopqrstuvwxyz!"] {
                let failures = validate_username(value);
                assert_eq!(kinds(&failures), vec![FailureKind::UsernameInvalid], "{value}");
                assert_eq!(failures[0].message, USERNAME_FORMAT_MESSAGE);
            }
        }

        #[test]
        fn test_bad_length_reports_length_once() {
            for value in ["a", "ab", "abcdefghijklmnopqrstu", "abcdefghijklmnopqrstuvwxyz"] {
                let failures = validate_username(value);
                assert_eq!(kinds(&failures), vec![FailureKind::UsernameInvalid], "{value}");
                assert_eq!(failures[0].message, USERNAME_LENGTH_MESSAGE);
            }
        }

        #[test]
        fn test_empty_is_left_to_required() {
            assert!(validate_username("").is_empty());
        }
    }

    mod email {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_shapes_pass() {
            for value in ["a@b.com", "user@example.com", "first.last+tag@sub.example.org"] {
                assert!(validate_email(value).is_empty(), "{value}");
            }
        }

        #[test]
        fn test_invalid_shapes_fail() {
            for value in ["plain", "a@b", "@example.com", "user@", "user@.com", "a b@c.com"] {
                assert_eq!(kinds(&validate_email(value)), vec![FailureKind::Email], "{value}");
            }
        }

        #[test]
        fn test_empty_is_left_to_required() {
            assert!(validate_email("").is_empty());
        }
    }

    mod merged {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_field_only_required() {
            for field in Field::ALL {
                assert_eq!(kinds(&field_failures(field, "")), vec![FailureKind::Required]);
            }
        }

        #[test]
        fn test_username_format_message_selected() {
            let failures = field_failures(Field::Username, "ab$");
            assert_eq!(select_message(&failures), USERNAME_FORMAT_MESSAGE);
        }

        #[test]
        fn test_email_required_message_selected() {
            let failures = field_failures(Field::Email, "");
            assert_eq!(select_message(&failures), REQUIRED_MESSAGE);
        }
    }

    mod selection {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_required_wins_over_format() {
            let failures = vec![
                ValidationFailure::new(FailureKind::UsernameInvalid, USERNAME_FORMAT_MESSAGE),
                ValidationFailure::required(),
            ];
            assert_eq!(select_message(&failures), REQUIRED_MESSAGE);
        }

        #[test]
        fn test_format_wins_over_server() {
            let failures = vec![
                ValidationFailure::server("already taken"),
                ValidationFailure::new(FailureKind::Email, EMAIL_MESSAGE),
            ];
            assert_eq!(select_message(&failures), EMAIL_MESSAGE);
        }

        #[test]
        fn test_empty_list_gives_empty_string() {
            assert_eq!(select_message(&[]), "");
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_alphanumeric_within_bounds_passes(value in "[a-zA-Z0-9]{3,20}") {
                prop_assert!(validate_username(&value).is_empty());
            }

            #[test]
            fn prop_any_foreign_char_is_one_format_failure(
                value in "[a-zA-Z0-9]{0,30}[^a-zA-Z0-9][a-zA-Z0-9]{0,30}"
            ) {
                let failures = validate_username(&value);
                prop_assert_eq!(kinds(&failures), vec![FailureKind::UsernameInvalid]);
                prop_assert_eq!(failures[0].message.as_str(), USERNAME_FORMAT_MESSAGE);
            }

            #[test]
            fn prop_out_of_bounds_length_is_one_length_failure(
                value in "[a-zA-Z0-9]{1,2}|[a-zA-Z0-9]{21,40}"
            ) {
                let failures = validate_username(&value);
                prop_assert_eq!(kinds(&failures), vec![FailureKind::UsernameInvalid]);
                prop_assert_eq!(failures[0].message.as_str(), USERNAME_LENGTH_MESSAGE);
            }

            #[test]
            fn prop_non_empty_is_never_required(value in "\\PC+") {
                prop_assert!(validate_required(&value).is_empty());
            }
        }
    }

    #[test]
    fn test_failure_kind_wire_names() {
        let names: Vec<String> = [
            FailureKind::Required,
            FailureKind::UsernameInvalid,
            FailureKind::Email,
            FailureKind::Server,
        ]
        .iter()
        .map(|kind| serde_json::to_string(kind).unwrap())
        .collect();
        assert_eq!(
            names,
            vec!["\"required\"", "\"usernameInvalid\"", "\"email\"", "\"server\""]
        );
    }
}
