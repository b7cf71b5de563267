use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: Id,
    pub title: String,
    #[serde(default, alias = "priorityOrder")]
    pub priority_order: i64,
}
