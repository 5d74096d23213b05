//! Value model for the sqlexec virtual-table adapter.
//!
//! [`SqliteValue`] is the dynamically-typed value that crosses the SPI
//! boundary in both directions: the host engine produces it when stepping a
//! prepared statement, and the adapter hands it back to the host when a
//! column of the current row is read.

use std::fmt;

/// A dynamically-typed database value.
///
/// The host engine has five fundamental storage classes: NULL, INTEGER,
/// REAL, TEXT, and BLOB.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SqliteValue {
    /// SQL NULL.
    Null,
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit IEEE 754 floating-point number.
    Float(f64),
    /// A UTF-8 text string.
    Text(String),
    /// A binary large object.
    Blob(Vec<u8>),
}

impl SqliteValue {
    /// Returns true if this is a NULL value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to extract an integer value.
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to extract a float value.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to extract a text reference.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract a blob reference.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the `typeof()` string for this value.
    ///
    /// Matches the host engine: "null", "integer", "real", "text", or "blob".
    pub const fn typeof_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for SqliteValue {
    /// SQL-literal rendering, used in diagnostics and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Blob(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

impl From<i64> for SqliteValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for SqliteValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for SqliteValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for SqliteValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SqliteValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for SqliteValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Blob(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqliteValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert!(SqliteValue::Null.is_null());
        assert_eq!(SqliteValue::Integer(7).as_integer(), Some(7));
        assert_eq!(SqliteValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(SqliteValue::from("hi").as_text(), Some("hi"));
        assert_eq!(
            SqliteValue::Blob(vec![1, 2]).as_blob(),
            Some([1u8, 2].as_slice())
        );
        assert_eq!(SqliteValue::Integer(7).as_text(), None);
        assert_eq!(SqliteValue::from("hi").as_integer(), None);
    }

    #[test]
    fn typeof_strings() {
        assert_eq!(SqliteValue::Null.typeof_str(), "null");
        assert_eq!(SqliteValue::Integer(0).typeof_str(), "integer");
        assert_eq!(SqliteValue::Float(0.0).typeof_str(), "real");
        assert_eq!(SqliteValue::from("x").typeof_str(), "text");
        assert_eq!(SqliteValue::Blob(Vec::new()).typeof_str(), "blob");
    }

    #[test]
    fn display_renders_sql_literals() {
        assert_eq!(SqliteValue::Null.to_string(), "NULL");
        assert_eq!(SqliteValue::Integer(-3).to_string(), "-3");
        assert_eq!(SqliteValue::from("main").to_string(), "'main'");
        assert_eq!(SqliteValue::Blob(vec![0xAB, 0x01]).to_string(), "X'AB01'");
    }

    #[test]
    fn from_conversions() {
        assert_eq!(SqliteValue::from(42i64), SqliteValue::Integer(42));
        assert_eq!(SqliteValue::from(42i32), SqliteValue::Integer(42));
        assert_eq!(SqliteValue::from(0.5), SqliteValue::Float(0.5));
        assert_eq!(
            SqliteValue::from(String::from("s")),
            SqliteValue::Text("s".to_owned())
        );
        assert_eq!(SqliteValue::from(vec![9u8]), SqliteValue::Blob(vec![9]));
        assert_eq!(SqliteValue::from(None::<i64>), SqliteValue::Null);
        assert_eq!(SqliteValue::from(Some(3i64)), SqliteValue::Integer(3));
    }
}
