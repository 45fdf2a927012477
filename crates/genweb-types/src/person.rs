//! Person records from `/api/v1/people/{id}`

use serde::{Deserialize, Deserializer, Serialize};

use crate::Identifier;

/// A person in the genealogy directory.
///
/// Relations are identifier references; the client never follows them
/// eagerly and never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: Identifier,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub surname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub given: String,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub deathdate: Option<String>,
    #[serde(default)]
    pub parents: Vec<Identifier>,
    #[serde(default)]
    pub spouses: Vec<Identifier>,
    #[serde(default)]
    pub children: Vec<Identifier>,
    /// Metadata records this person appears in
    #[serde(default)]
    pub metadata: Vec<Identifier>,
}

/// Server sends `null` for unknown names; treat it as empty text
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
