//! Typed CRUD operations for every entity kind the catalog exposes.

use async_trait::async_trait;

use crate::client::{ApiClient, ApiRequest, FilePart, MultipartBody};
use crate::error::{CatalogError, Result};
use crate::types::{
    Category, Id, ImageUpload, Project, ProjectPayload, Screenshot, Technology, TechnologyDraft,
};

const PROJECTS: &str = "projects/";
const TECHNOLOGIES: &str = "technologies/";
const CATEGORIES: &str = "categories";
const SCREENSHOTS: &str = "screenshots/";

/// Optional subset and ordering for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub ids: Vec<Id>,
    pub ordering: Vec<String>,
}

impl ListFilter {
    pub fn ids(ids: &[Id]) -> Self {
        Self {
            ids: ids.to_vec(),
            ordering: Vec::new(),
        }
    }

    pub fn ordered_by(mut self, key: &str) -> Self {
        self.ordering.push(key.to_string());
        self
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let ids = self.ids.iter().map(|id| ("ids[]".to_string(), id.to_string()));
        let ordering = self
            .ordering
            .iter()
            .map(|key| ("ordering[]".to_string(), key.clone()));

        ids.chain(ordering).collect()
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_projects(&self, ordering: &[String]) -> Result<Vec<Project>>;
    async fn get_project(&self, id: &Id) -> Result<Project>;
    async fn create_project(&self, payload: &ProjectPayload) -> Result<Project>;
    async fn update_project(&self, id: &Id, payload: &ProjectPayload) -> Result<Project>;
    async fn delete_project(&self, id: &Id) -> Result<()>;

    async fn list_technologies(&self, filter: &ListFilter) -> Result<Vec<Technology>>;
    async fn create_technology(&self, draft: &TechnologyDraft) -> Result<Technology>;

    async fn list_categories(&self, filter: &ListFilter) -> Result<Vec<Category>>;

    async fn list_screenshots(&self, filter: &ListFilter) -> Result<Vec<Screenshot>>;
    async fn create_screenshot(&self, upload: &ImageUpload, project: &Id) -> Result<Screenshot>;
    async fn delete_screenshot(&self, id: &Id) -> Result<()>;
}

/// `collection/<id>/`, with the id escaped as a single path segment.
fn detail_path(collection: &str, id: &Id) -> Result<String> {
    let raw = id.to_string();
    // URL joining resolves dot segments even when percent-encoded.
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(CatalogError::InvalidInput {
            field: "id",
            message: format!("\"{raw}\" is not a usable record id"),
        });
    }

    Ok(format!("{collection}{}/", urlencoding::encode(&raw)))
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn list_projects(&self, ordering: &[String]) -> Result<Vec<Project>> {
        let filter = ListFilter {
            ids: Vec::new(),
            ordering: ordering.to_vec(),
        };
        self.execute_json(&ApiRequest::get(PROJECTS).query(filter.to_query()))
            .await
    }

    async fn get_project(&self, id: &Id) -> Result<Project> {
        self.execute_json(&ApiRequest::get(detail_path(PROJECTS, id)?))
            .await
    }

    async fn create_project(&self, payload: &ProjectPayload) -> Result<Project> {
        self.execute_json(&ApiRequest::post(PROJECTS).json(payload)?)
            .await
    }

    async fn update_project(&self, id: &Id, payload: &ProjectPayload) -> Result<Project> {
        self.execute_json(&ApiRequest::put(detail_path(PROJECTS, id)?).json(payload)?)
            .await
    }

    async fn delete_project(&self, id: &Id) -> Result<()> {
        self.execute(&ApiRequest::delete(detail_path(PROJECTS, id)?))
            .await?;
        Ok(())
    }

    async fn list_technologies(&self, filter: &ListFilter) -> Result<Vec<Technology>> {
        self.execute_json(&ApiRequest::get(TECHNOLOGIES).query(filter.to_query()))
            .await
    }

    async fn create_technology(&self, draft: &TechnologyDraft) -> Result<Technology> {
        self.execute_json(&ApiRequest::post(TECHNOLOGIES).json(draft)?)
            .await
    }

    async fn list_categories(&self, filter: &ListFilter) -> Result<Vec<Category>> {
        self.execute_json(&ApiRequest::get(CATEGORIES).query(filter.to_query()))
            .await
    }

    async fn list_screenshots(&self, filter: &ListFilter) -> Result<Vec<Screenshot>> {
        self.execute_json(&ApiRequest::get(SCREENSHOTS).query(filter.to_query()))
            .await
    }

    async fn create_screenshot(&self, upload: &ImageUpload, project: &Id) -> Result<Screenshot> {
        let body = MultipartBody {
            text: vec![("project".to_string(), project.to_string())],
            files: vec![FilePart {
                field: "image".to_string(),
                file_name: upload.file_name.clone(),
                content_type: upload.content_type.clone(),
                bytes: upload.bytes.clone(),
            }],
        };

        self.execute_json(&ApiRequest::post(SCREENSHOTS).multipart(body))
            .await
    }

    async fn delete_screenshot(&self, id: &Id) -> Result<()> {
        self.execute(&ApiRequest::delete(detail_path(SCREENSHOTS, id)?))
            .await?;
        Ok(())
    }
}
