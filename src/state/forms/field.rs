//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The two input slots of the sign-up form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Email,
}

impl Field {
    /// All fields in display order
    pub const ALL: [Field; 2] = [Field::Username, Field::Email];

    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Snapshot of the form values taken at submit time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpFormData {
    pub username: String,
    pub email: String,
}

impl SignUpFormData {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Current value of each field plus which fields have been touched.
///
/// Pure storage: nothing here validates. An empty string is the unset
/// state, values are never absent.
#[derive(Debug, Clone, Default)]
pub struct FieldModel {
    username: String,
    email: String,
    touched: BTreeSet<Field>,
}

impl FieldModel {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, field: Field, c: char) {
        self.slot_mut(field).push(c);
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self, field: Field) {
        self.slot_mut(field).pop();
    }

    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(Field::ALL);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// Empty both fields and forget touched state
    pub fn reset(&mut self) {
        self.username.clear();
        self.email.clear();
        self.touched.clear();
    }

    pub fn snapshot(&self) -> SignUpFormData {
        SignUpFormData::new(self.username.clone(), self.email.clone())
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
        }
    }
}
