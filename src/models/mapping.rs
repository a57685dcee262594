use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Entity kinds that can be given an opaque id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Series,
    Chapter,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Series => "series",
            EntityKind::Chapter => "chapter",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown entity type \"{0}\"")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "series" => Ok(EntityKind::Series),
            "chapter" => Ok(EntityKind::Chapter),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// One stored slug to uuid pairing. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub uuid: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_closed_set() {
        assert_eq!("series".parse::<EntityKind>(), Ok(EntityKind::Series));
        assert_eq!("chapter".parse::<EntityKind>(), Ok(EntityKind::Chapter));
        assert!("Series".parse::<EntityKind>().is_err());
        assert!("".parse::<EntityKind>().is_err());
    }

    #[test]
    fn unknown_kind_is_a_std_error() {
        let err = "volume".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, UnknownEntityKind("volume".into()));
        assert_eq!(err.to_string(), "unknown entity type \"volume\"");

        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn record_serializes_kind_as_type() {
        let record = MappingRecord {
            uuid: "u".into(),
            slug: "one-piece".into(),
            kind: EntityKind::Series,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"uuid": "u", "slug": "one-piece", "type": "series"})
        );
    }
}
