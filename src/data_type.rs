use std::fmt;
use std::str::FromStr;

use crate::error::DbError;

/// Represents the supported column types of a table schema.
/// A column is either numeric (machine integers) or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 64-bit signed integer, declared as `int`.
    Int,
    /// A UTF-8 character string, declared as `string`.
    Text,
}

impl DataType {
    /// Returns `true` for [DataType::Int], the only numeric type.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int)
    }

    /// Maps a schema flag (`true` = numeric) back to a type.
    pub fn from_flag(numeric: bool) -> Self {
        if numeric { Self::Int } else { Self::Text }
    }
}

impl FromStr for DataType {
    type Err = DbError;

    /// Parses a schema declaration tag, case-insensitively.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(Self::Int),
            "string" | "text" => Ok(Self::Text),
            _ => Err(DbError::UnknownType(tag.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Text => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Int);
        assert_eq!("INT".parse::<DataType>().unwrap(), DataType::Int);
        assert_eq!("String".parse::<DataType>().unwrap(), DataType::Text);
        assert_eq!("text".parse::<DataType>().unwrap(), DataType::Text);
        assert!(matches!(
            "float".parse::<DataType>(),
            Err(DbError::UnknownType(_))
        ));
    }

    #[test]
    fn test_flags() {
        assert!(DataType::Int.is_numeric());
        assert!(!DataType::Text.is_numeric());
        assert_eq!(DataType::from_flag(true), DataType::Int);
        assert_eq!(DataType::from_flag(false), DataType::Text);
    }
}
