use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a database engine family, e.g. `postgres`.
///
/// Opaque: no normalization is applied, `Postgres` and `postgres` are
/// different dialects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dialect(String);

impl Dialect {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dialect {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Dialect {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Dialect {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Dialect {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display_and_equality() {
        let d = Dialect::from("postgres");
        assert_eq!(d.to_string(), "postgres");
        assert_eq!(d, Dialect::new(String::from("postgres")));
        assert_ne!(d, Dialect::from("Postgres"));
    }
}
