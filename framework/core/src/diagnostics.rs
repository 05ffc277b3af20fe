use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Key used for the invocation's request identifier.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Key/value metadata that belongs to a single invocation and is attached to its log lines.
///
/// The context is owned by the caller and handed to any work spawned on its behalf, so a
/// background thread logs with exactly the fields of the invocation it is working for and nothing
/// else. There is no thread-local state involved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    fields: BTreeMap<String, String>,
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding only a request id.
    pub fn for_request(request_id: impl Into<String>) -> Self {
        Self::new().with_field(REQUEST_ID_KEY, request_id)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get(REQUEST_ID_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Renders as `{key=value, other=value}`, or `{}` when empty.
impl Display for DiagnosticContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DiagnosticContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
