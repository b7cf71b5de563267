use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    #[serde(alias = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub fields: ProjectPayload,
}

/// Everything a project carries except its identity; the body of
/// create and update requests.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "livePreview")]
    pub live_preview: String,
    #[serde(default, alias = "sourceCode")]
    pub source_code: String,
    #[serde(default, alias = "priorityOrder")]
    pub priority_order: i64,
    #[serde(default)]
    pub technologies: Vec<Id>,
    #[serde(default)]
    pub categories: Vec<Id>,
    #[serde(default)]
    pub screenshots: Vec<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_camel_case_and_object_ids() {
        let project: Project = serde_json::from_value(json!({
            "_id": "abc",
            "title": "Portfolio",
            "livePreview": "https://example.com",
            "sourceCode": "https://git.example.com",
            "priorityOrder": 3,
            "technologies": ["t1"],
            "categories": [],
            "screenshots": ["s1", "s2"]
        }))
        .unwrap();

        assert_eq!(project.id, Id::from("abc"));
        assert_eq!(project.fields.live_preview, "https://example.com");
        assert_eq!(project.fields.priority_order, 3);
        assert_eq!(project.fields.screenshots.len(), 2);
    }

    #[test]
    fn payload_serializes_snake_case_without_id() {
        let payload = ProjectPayload {
            title: "Shop".to_string(),
            technologies: vec![Id::Int(1)],
            ..ProjectPayload::default()
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["title"], "Shop");
        assert_eq!(value["live_preview"], "");
        assert_eq!(value["technologies"], json!([1]));
        assert!(value.get("id").is_none());
    }
}
