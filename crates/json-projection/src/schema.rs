//! Key-selection filters for the projector.
//!
//! A [`Schema`] is either [`Schema::All`], keep the whole subtree, or
//! [`Schema::Fields`], keep only the listed keys of an object, each with its
//! own nested schema. Arrays do not introduce a level: every element of an
//! array is filtered with the array's own schema. Scalars ignore the schema.
//!
//! Schemas can be written as JSON, where `null` stands for "everything":
//!
//! ```
//! use json_projection::{Schema, schema};
//!
//! let parsed: Schema = r#"{"a": {"b": null}, "c": null}"#.parse().unwrap();
//! let built = Schema::fields()
//!     .field("a", Schema::fields().field("b", Schema::all()))
//!     .field("c", Schema::all());
//! assert_eq!(parsed, built);
//! assert_eq!(parsed, schema!({ "a": { "b" }, "c" }));
//! ```

use std::{collections::BTreeMap, str::FromStr};

use serde_json::Value;
use thiserror::Error;

/// A recursive key filter. The default is [`Schema::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(
        from = "Option<BTreeMap<String, Schema>>",
        into = "Option<BTreeMap<String, Schema>>"
    )
)]
pub enum Schema {
    /// Keep the entire subtree.
    #[default]
    All,
    /// Inside objects, keep only these keys.
    Fields(BTreeMap<String, Schema>),
}

static ALL: Schema = Schema::All;

impl Schema {
    /// Keeps everything.
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    /// Keeps no keys at all; add some with [`field`](Self::field).
    #[must_use]
    pub fn fields() -> Self {
        Self::Fields(BTreeMap::new())
    }

    /// Adds `key` with the nested schema `sub`.
    ///
    /// Calling this on [`Schema::All`] turns it into a filter containing only
    /// `key`.
    #[must_use]
    pub fn field(self, key: impl Into<String>, sub: Schema) -> Self {
        let mut fields = match self {
            Self::All => BTreeMap::new(),
            Self::Fields(fields) => fields,
        };
        fields.insert(key.into(), sub);
        Self::Fields(fields)
    }

    /// Returns `true` for [`Schema::All`].
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The schema to apply to the value under `key`, or `None` if the key is
    /// not interesting.
    #[must_use]
    pub fn select(&self, key: &str) -> Option<&Schema> {
        match self {
            Self::All => Some(&ALL),
            Self::Fields(fields) => fields.get(key),
        }
    }
}

impl From<BTreeMap<String, Schema>> for Schema {
    fn from(fields: BTreeMap<String, Schema>) -> Self {
        Self::Fields(fields)
    }
}

impl From<Option<BTreeMap<String, Schema>>> for Schema {
    fn from(fields: Option<BTreeMap<String, Schema>>) -> Self {
        fields.map_or(Self::All, Self::Fields)
    }
}

impl From<Schema> for Option<BTreeMap<String, Schema>> {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::All => None,
            Schema::Fields(fields) => Some(fields),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Schema)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, Schema)>>(iter: I) -> Self {
        Self::Fields(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A JSON value that does not describe a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not JSON.
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A node that is neither an object nor `null`.
    #[error("schema node at {path} must be an object or null, found {found}")]
    InvalidNode {
        /// Dotted path of the node, starting at `$`.
        path: String,
        /// The offending JSON value.
        found: Value,
    },
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        from_value(value, "$")
    }
}

fn from_value(value: &Value, path: &str) -> Result<Schema, SchemaError> {
    match value {
        Value::Null => Ok(Schema::All),
        Value::Object(map) => map
            .iter()
            .map(|(key, sub)| Ok((key.clone(), from_value(sub, &format!("{path}.{key}"))?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Schema::Fields),
        other => Err(SchemaError::InvalidNode {
            path: path.to_owned(),
            found: other.clone(),
        }),
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(&value)
    }
}

/// Builds a [`Schema`] from a JSON-like listing of keys.
///
/// A bare key keeps its whole subtree; a key followed by `: { ... }` nests a
/// filter. `*` (or `null`) on its own is [`Schema::All`].
///
/// ```rust
/// # use json_projection::{schema, Schema};
/// let s = schema!({ "user": { "id", "name" }, "action" });
/// assert_eq!(
///     s,
///     Schema::fields()
///         .field(
///             "user",
///             Schema::fields()
///                 .field("id", Schema::all())
///                 .field("name", Schema::all())
///         )
///         .field("action", Schema::all())
/// );
/// assert_eq!(schema!(*), Schema::All);
/// ```
#[macro_export]
macro_rules! schema {
    (@sub) => { $crate::Schema::All };
    (@sub $sub:tt) => { $crate::schema!($sub) };
    (*) => { $crate::Schema::All };
    (null) => { $crate::Schema::All };
    ({ $( $key:literal $( : $sub:tt )? ),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut schema = $crate::Schema::fields();
        $( schema = schema.field($key, $crate::schema!(@sub $($sub)?)); )*
        schema
    }};
}
