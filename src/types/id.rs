use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backend-assigned identity. Some deployments use integer keys, others
/// string object ids, so both are accepted and echoed back unchanged.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(value) => write!(f, "{value}"),
            Id::Str(value) => f.write_str(value),
        }
    }
}

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<i64>()
            .map(Id::Int)
            .unwrap_or_else(|_| Id::Str(trimmed.to_string())))
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Int(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Str(value.to_string())
    }
}

/// Render an association list for table output.
pub fn join_ids(ids: &[Id]) -> String {
    ids.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_input_as_integer() {
        assert_eq!("42".parse::<Id>().unwrap(), Id::Int(42));
        assert_eq!(" 7 ".parse::<Id>().unwrap(), Id::Int(7));
    }

    #[test]
    fn parses_object_id_as_string() {
        let id: Id = "62a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(id, Id::Str("62a1f0c2e4b0a1b2c3d4e5f6".to_string()));
    }

    #[test]
    fn keeps_wire_shape() {
        let ids: Vec<Id> = serde_json::from_str(r#"[1, "abc"]"#).unwrap();
        assert_eq!(ids, vec![Id::Int(1), Id::from("abc")]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[1,"abc"]"#);
    }

    #[test]
    fn joins_for_display() {
        assert_eq!(join_ids(&[Id::Int(1), Id::from("x")]), "1, x");
        assert_eq!(join_ids(&[]), "");
    }
}
