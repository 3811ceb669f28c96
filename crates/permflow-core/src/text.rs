//! UI-facing message values
//!
//! A message either carries literal text or a resource key with positional
//! arguments. The host resolves keys through its own catalog; no locale
//! tables ship with this crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host-side lookup of message templates by key
///
/// Templates use `{0}`, `{1}`, … placeholders for positional arguments.
pub trait MessageCatalog {
    /// Return the template for a key, or `None` when the key is unknown
    fn template(&self, key: &str) -> Option<String>;
}

impl MessageCatalog for std::collections::HashMap<String, String> {
    fn template(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A user-visible message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiMessage {
    /// Literal text, shown as-is
    Literal { value: String },

    /// Resource-keyed text with positional arguments
    Keyed {
        key: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl UiMessage {
    /// Create a literal message
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Create a keyed message without arguments
    pub fn keyed(key: impl Into<String>) -> Self {
        Self::Keyed {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// Create a keyed message with positional arguments
    pub fn keyed_with(key: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Keyed {
            key: key.into(),
            args,
        }
    }

    /// Resolve the message against a catalog
    ///
    /// Keyed messages substitute arguments positionally; a missing key falls
    /// back to the bare key so the caller always gets displayable text.
    pub fn resolve(&self, catalog: &dyn MessageCatalog) -> String {
        match self {
            Self::Literal { value } => value.clone(),
            Self::Keyed { key, args } => match catalog.template(key) {
                Some(template) => substitute(&template, args),
                None => key.clone(),
            },
        }
    }
}

fn substitute(template: &str, args: &[Value]) -> String {
    let mut out = template.to_string();
    for (position, arg) in args.iter().enumerate() {
        let placeholder = format!("{{{}}}", position);
        let text = match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&placeholder, &text);
    }
    out
}
