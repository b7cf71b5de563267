use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Technology {
    #[serde(alias = "_id")]
    pub id: Id,
    pub name: String,
}

/// A technology typed into a project form that the server has not seen yet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TechnologyDraft {
    pub name: String,
}
