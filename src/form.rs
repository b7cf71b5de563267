//! Project create/edit submission.
//!
//! A submission creates the pending children first, then persists the
//! project, then uploads pending screenshots against the now-known project
//! id, and finally deletes screenshots the user unchecked. Every step is
//! sequential and nothing is rolled back when a later step fails.

use std::fmt;

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, Mutation, ViewCache};
use crate::error::{CatalogError, Result};
use crate::resources::CatalogApi;
use crate::types::{Id, ImageUpload, Project, ProjectPayload, TechnologyDraft};

/// Progress of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    ChildrenResolved,
    Persisting,
    AssociationsReconciled,
    Done(Id),
    Failed(String),
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => f.write_str("idle"),
            SubmissionState::Submitting => f.write_str("submitting"),
            SubmissionState::ChildrenResolved => f.write_str("children resolved"),
            SubmissionState::Persisting => f.write_str("persisting"),
            SubmissionState::AssociationsReconciled => f.write_str("associations reconciled"),
            SubmissionState::Done(id) => write!(f, "done ({id})"),
            SubmissionState::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Which association list a checkbox belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Technologies,
    Categories,
    Screenshots,
}

#[derive(Debug, Clone)]
enum FormMode {
    Create,
    Edit { previous: Project },
}

#[derive(Debug, Clone)]
pub struct ProjectForm {
    mode: FormMode,
    pub inputs: ProjectPayload,
    new_technologies: Vec<TechnologyDraft>,
    new_screenshots: Vec<ImageUpload>,
    state: SubmissionState,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self::create()
    }
}

impl ProjectForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            inputs: ProjectPayload::default(),
            new_technologies: Vec::new(),
            new_screenshots: Vec::new(),
            state: SubmissionState::Idle,
        }
    }

    /// Start editing a project as loaded from the API.
    pub fn edit(project: Project) -> Self {
        Self {
            inputs: project.fields.clone(),
            mode: FormMode::Edit { previous: project },
            new_technologies: Vec::new(),
            new_screenshots: Vec::new(),
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn project_id(&self) -> Option<&Id> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit { previous } => Some(&previous.id),
        }
    }

    pub fn new_technologies(&self) -> &[TechnologyDraft] {
        &self.new_technologies
    }

    pub fn new_screenshots(&self) -> &[ImageUpload] {
        &self.new_screenshots
    }

    /// Queue a technology to be created on submit. Blank and repeated
    /// names are ignored.
    pub fn add_technology(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.new_technologies.iter().any(|t| t.name == name) {
            return;
        }

        self.new_technologies.push(TechnologyDraft {
            name: name.to_string(),
        });
    }

    /// Drop a queued technology before it is created.
    #[allow(dead_code)]
    pub fn remove_technology_draft(&mut self, name: &str) {
        let name = name.trim();
        self.new_technologies.retain(|t| t.name != name);
    }

    pub fn add_screenshot(&mut self, upload: ImageUpload) {
        self.new_screenshots.push(upload);
    }

    pub fn check(&mut self, association: Association, id: Id) {
        let list = self.list_mut(association);
        if !list.contains(&id) {
            list.push(id);
        }
    }

    pub fn uncheck(&mut self, association: Association, id: &Id) {
        self.list_mut(association).retain(|existing| existing != id);
    }

    fn list_mut(&mut self, association: Association) -> &mut Vec<Id> {
        match association {
            Association::Technologies => &mut self.inputs.technologies,
            Association::Categories => &mut self.inputs.categories,
            Association::Screenshots => &mut self.inputs.screenshots,
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = %self.state, to = %next, "submission state");
        self.state = next;
    }

    /// Run the submission pipeline. On failure the form keeps its pending
    /// drafts and the state carries the error message.
    pub async fn submit<A>(&mut self, api: &A, views: &mut ViewCache) -> Result<Project>
    where
        A: CatalogApi + ?Sized,
    {
        self.transition(SubmissionState::Submitting);

        match self.run_pipeline(api, views).await {
            Ok(project) => {
                self.new_technologies.clear();
                self.new_screenshots.clear();
                self.inputs = project.fields.clone();

                views.invalidate_after(&Mutation::UpdateProject(project.id.clone()));
                for key in [
                    CacheKey::Projects,
                    CacheKey::Technologies,
                    CacheKey::Screenshots,
                ] {
                    views.invalidate(&key);
                }

                info!(id = %project.id, "project saved");
                self.transition(SubmissionState::Done(project.id.clone()));
                self.mode = FormMode::Edit {
                    previous: project.clone(),
                };

                Ok(project)
            }
            Err(err) => {
                warn!(error = %err, "project submission failed");
                self.transition(SubmissionState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_pipeline<A>(&mut self, api: &A, views: &mut ViewCache) -> Result<Project>
    where
        A: CatalogApi + ?Sized,
    {
        if self.inputs.title.trim().is_empty() {
            return Err(CatalogError::MissingField("title"));
        }

        let mut payload = self.inputs.clone();

        // Strictly one at a time: the server dedupes names, and concurrent
        // creates of the same name would both succeed.
        for draft in &self.new_technologies {
            let technology = api.create_technology(draft).await?;
            views.invalidate_after(&Mutation::CreateTechnology);
            debug!(name = %draft.name, id = %technology.id, "technology created");
            payload.technologies.push(technology.id);
        }
        self.transition(SubmissionState::ChildrenResolved);

        self.transition(SubmissionState::Persisting);
        let mut project = match &self.mode {
            FormMode::Edit { previous } => api.update_project(&previous.id, &payload).await?,
            FormMode::Create => {
                let created = api.create_project(&payload).await?;
                views.invalidate_after(&Mutation::CreateProject);
                created
            }
        };

        if !self.new_screenshots.is_empty() {
            for upload in &self.new_screenshots {
                let screenshot = api.create_screenshot(upload, &project.id).await?;
                views.invalidate_after(&Mutation::CreateScreenshot);
                debug!(file = %upload.file_name, id = %screenshot.id, "screenshot uploaded");
                payload.screenshots.push(screenshot.id);
            }

            project = api.update_project(&project.id, &payload).await?;
        }

        if let FormMode::Edit { previous } = &self.mode {
            let removed = previous
                .fields
                .screenshots
                .iter()
                .filter(|id| !payload.screenshots.contains(id));

            for id in removed {
                api.delete_screenshot(id).await?;
                views.invalidate_after(&Mutation::DeleteScreenshot);
                debug!(%id, "screenshot deleted");
            }
        }
        self.transition(SubmissionState::AssociationsReconciled);

        Ok(project)
    }
}
