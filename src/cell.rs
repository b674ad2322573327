use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use allocative::Allocative;

use crate::data_type::DataType;
use crate::error::{DbError, DbResult};

/// A single typed value stored in a table.
///
/// Every cell is either numeric or text, and either variant may carry no
/// payload at all (a null, used to pad outer joins). Equality is
/// variant-exact: a numeric cell never equals a text cell, whatever they
/// render as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Allocative)]
pub enum Cell {
    /// A 64-bit signed integer, or a numeric null.
    Numeric(Option<i64>),
    /// A UTF-8 string wrapped in an [Arc] for cheap cloning, or a text null.
    Text(Option<Arc<str>>),
}

impl Cell {
    /// Builds a present numeric cell.
    pub fn int(value: i64) -> Self {
        Self::Numeric(Some(value))
    }

    /// Builds a present text cell.
    pub fn text(value: impl AsRef<str>) -> Self {
        Self::Text(Some(Arc::from(value.as_ref())))
    }

    /// Builds the null cell of the given type.
    pub fn null(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => Self::Numeric(None),
            DataType::Text => Self::Text(None),
        }
    }

    /// Parses a raw text field into a cell of the given type.
    ///
    /// # Errors
    /// Returns [DbError::InvalidNumber] if the column is numeric and the
    /// field is not an integer.
    ///
    /// # Example
    /// ```
    /// # use reldb::{Cell, DataType};
    /// assert_eq!(Cell::parse("42", DataType::Int).unwrap(), Cell::int(42));
    /// assert_eq!(Cell::parse("42", DataType::Text).unwrap(), Cell::text("42"));
    /// assert!(Cell::parse("forty", DataType::Int).is_err());
    /// ```
    pub fn parse(field: &str, data_type: DataType) -> DbResult<Self> {
        match data_type {
            DataType::Int => field
                .parse::<i64>()
                .map(Self::int)
                .map_err(|_| DbError::InvalidNumber(field.to_string())),
            DataType::Text => Ok(Self::text(field)),
        }
    }

    /// Returns `true` if this is a [Cell::Numeric], null or not.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Returns `true` if the cell carries no payload.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Numeric(None) | Self::Text(None))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric(_) => DataType::Int,
            Self::Text(_) => DataType::Text,
        }
    }

    /// Returns the integer payload of a present numeric cell.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Numeric(value) => *value,
            Self::Text(_) => None,
        }
    }

    /// Returns the string payload of a present text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(Some(s)) => Some(s),
            _ => None,
        }
    }

    /// The text form used for display and for mixed-type ordering.
    /// Nulls render as the empty string.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Numeric(Some(i)) => Cow::Owned(i.to_string()),
            Self::Text(Some(s)) => Cow::Borrowed(s),
            Self::Numeric(None) | Self::Text(None) => Cow::Borrowed(""),
        }
    }

    /// Orders two cells.
    ///
    /// Two numeric cells compare by value, with a null ordering before any
    /// present integer. Any other pairing compares the rendered strings, so
    /// a numeric cell against a text cell follows string order.
    ///
    /// ```
    /// # use std::cmp::Ordering;
    /// # use reldb::Cell;
    /// assert_eq!(Cell::int(9).compare(&Cell::int(10)), Ordering::Less);
    /// assert_eq!(Cell::int(9).compare(&Cell::text("10")), Ordering::Greater);
    /// ```
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Self::Numeric(left), Self::Numeric(right)) => left.cmp(right),
            _ => self.render().cmp(&other.render()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : equality is variant-exact
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_equality() {
        assert_eq!(Cell::int(10), Cell::int(10));
        assert_ne!(Cell::int(10), Cell::int(20));
        assert_eq!(Cell::text("abc"), Cell::text("abc"));
        assert_ne!(Cell::int(1), Cell::text("1"));
        assert_eq!(Cell::Numeric(None), Cell::Numeric(None));
        assert_eq!(Cell::Text(None), Cell::Text(None));
        assert_ne!(Cell::Numeric(None), Cell::Text(None));
        assert_ne!(Cell::Text(None), Cell::text(""));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : ordering
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_compare_numeric() {
        assert_eq!(Cell::int(2).compare(&Cell::int(10)), Ordering::Less);
        assert_eq!(Cell::int(-5).compare(&Cell::int(-5)), Ordering::Equal);
        assert_eq!(
            Cell::int(i64::MAX).compare(&Cell::int(i64::MIN)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_numeric_null() {
        assert_eq!(Cell::Numeric(None).compare(&Cell::int(-100)), Ordering::Less);
        assert_eq!(Cell::int(0).compare(&Cell::Numeric(None)), Ordering::Greater);
        assert_eq!(
            Cell::Numeric(None).compare(&Cell::Numeric(None)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_falls_back_to_strings() {
        assert_eq!(Cell::text("apple").compare(&Cell::text("banana")), Ordering::Less);
        // string order, not numeric order
        assert_eq!(Cell::int(2).compare(&Cell::text("10")), Ordering::Greater);
        assert_eq!(Cell::text("").compare(&Cell::Text(None)), Ordering::Equal);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : rendering
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_display() {
        assert_eq!(Cell::int(42).to_string(), "42");
        assert_eq!(Cell::int(-3).to_string(), "-3");
        assert_eq!(Cell::text("hi").to_string(), "hi");
        assert_eq!(Cell::Numeric(None).to_string(), "");
        assert_eq!(Cell::Text(None).to_string(), "");
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : parsing and accessors
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_parse() {
        assert_eq!(Cell::parse("-7", DataType::Int).unwrap(), Cell::int(-7));
        assert_eq!(Cell::parse("", DataType::Text).unwrap(), Cell::text(""));
        assert!(matches!(
            Cell::parse("1.5", DataType::Int),
            Err(DbError::InvalidNumber(_))
        ));
        assert!(Cell::parse("", DataType::Int).is_err());
    }

    #[test]
    fn test_accessors() {
        assert!(Cell::int(1).is_numeric());
        assert!(Cell::Numeric(None).is_numeric());
        assert!(!Cell::text("x").is_numeric());
        assert!(Cell::null(DataType::Text).is_null());
        assert_eq!(Cell::null(DataType::Int), Cell::Numeric(None));
        assert_eq!(Cell::int(4).as_int(), Some(4));
        assert_eq!(Cell::Numeric(None).as_int(), None);
        assert_eq!(Cell::text("x").as_str(), Some("x"));
        assert_eq!(Cell::int(4).as_str(), None);
        assert_eq!(Cell::text("x").data_type(), DataType::Text);
    }

    #[test]
    fn test_clone() {
        let c1 = Cell::text("hello");
        let c2 = c1.clone();
        assert_eq!(c1, c2);
        assert!(!c2.is_numeric());
    }
}
