//! Flexible identifiers for resource lookups.
//!
//! Callers address remote items either by numeric ID or by a name-like
//! string; strings containing `@` address people by email. The dispatch is
//! an explicit sum type so each resource's key lookup is exhaustive.

use std::fmt;

use serde_json::Value;

/// A caller-supplied identifier for a resource item.
///
/// Conversions mirror the lookup conventions of the remote API: integers
/// are primary-key lookups, strings are name lookups, and strings
/// containing `@` are email lookups.
///
/// # Example
///
/// ```
/// use procore_api::Identifier;
///
/// assert_eq!(Identifier::from(42u64), Identifier::Id(42));
/// assert_eq!(Identifier::from("Acme"), Identifier::Name("Acme".into()));
/// assert_eq!(
///     Identifier::from("jane@example.com"),
///     Identifier::Email("jane@example.com".into()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Primary-key lookup against the item's `id` field.
    Id(u64),
    /// Lookup against the resource's name-like field.
    Name(String),
    /// Lookup against the resource's email field.
    Email(String),
}

impl From<u64> for Identifier {
    fn from(id: u64) -> Self {
        Identifier::Id(id)
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Identifier::Id(u64::from(id))
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        if value.contains('@') {
            Identifier::Email(value.to_string())
        } else {
            Identifier::Name(value.to_string())
        }
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier::from(value.as_str())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{id}"),
            Identifier::Name(name) => f.write_str(name),
            Identifier::Email(email) => f.write_str(email),
        }
    }
}

/// Per-resource field names used to resolve an [`Identifier`].
///
/// The name-like key varies by resource (`name`, `title`, `number`,
/// `cost_code`, ...). Email lookups may traverse one level of nesting,
/// e.g. `contact.email` on directory people.
#[derive(Debug, Clone, Copy)]
pub struct KeyMap {
    /// Field compared for [`Identifier::Id`].
    pub id: &'static str,
    /// Field compared for [`Identifier::Name`].
    pub name: &'static str,
    /// Field path compared for [`Identifier::Email`]. When `None`, email
    /// identifiers fall back to the name field.
    pub email: Option<EmailKey>,
}

/// Nested field path for email lookups.
#[derive(Debug, Clone, Copy)]
pub enum EmailKey {
    /// Email lives in a top-level field, e.g. `email_address`.
    Flat(&'static str),
    /// Email lives one level down, e.g. `contact.email`.
    Nested(&'static str, &'static str),
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            id: "id",
            name: "name",
            email: None,
        }
    }
}

impl KeyMap {
    /// A key map whose name-like field differs from `name`.
    pub const fn named(name: &'static str) -> Self {
        Self {
            id: "id",
            name,
            email: None,
        }
    }

    /// True if `item`'s key field equals the identifier.
    pub fn matches(&self, item: &Value, identifier: &Identifier) -> bool {
        match identifier {
            Identifier::Id(id) => item.get(self.id).and_then(Value::as_u64) == Some(*id),
            Identifier::Name(name) => {
                item.get(self.name).and_then(Value::as_str) == Some(name.as_str())
            }
            Identifier::Email(email) => {
                let found = match self.email {
                    Some(EmailKey::Flat(key)) => item.get(key).and_then(Value::as_str),
                    Some(EmailKey::Nested(outer, inner)) => item
                        .get(outer)
                        .and_then(|nested| nested.get(inner))
                        .and_then(Value::as_str),
                    None => item.get(self.name).and_then(Value::as_str),
                };
                found == Some(email.as_str())
            }
        }
    }
}
