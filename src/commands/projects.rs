use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::cache::{CacheKey, Mutation, ViewCache};
use crate::cli::{ProjectCreateArgs, ProjectEditArgs};
use crate::commands::confirm;
use crate::error::Result;
use crate::form::{Association, ProjectForm};
use crate::output::{self, heading, or_dash, truncate};
use crate::resources::{CatalogApi, ListFilter};
use crate::types::{join_ids, Category, Id, ImageUpload, Project, Screenshot, Technology};

const DEFAULT_ORDERING: &str = "priority_order";

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: i64,
    #[tabled(rename = "Technologies")]
    technologies: String,
    #[tabled(rename = "Live preview")]
    live_preview: String,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.to_string(),
            title: truncate(&project.fields.title, 40),
            priority: project.fields.priority_order,
            technologies: join_ids(&project.fields.technologies),
            live_preview: or_dash(&truncate(&project.fields.live_preview, 40)),
        }
    }
}

/// A project together with the records its association lists point at.
#[derive(Serialize)]
struct ProjectDetail {
    #[serde(flatten)]
    project: Project,
    technology_names: Vec<Technology>,
    category_titles: Vec<Category>,
    screenshot_images: Vec<Screenshot>,
}

pub async fn list(api: &impl CatalogApi, views: &mut ViewCache) -> Result<()> {
    let ordering = vec![DEFAULT_ORDERING.to_string()];
    let projects: Vec<Project> = views
        .read_through(CacheKey::Projects, || api.list_projects(&ordering))
        .await?;

    if projects.is_empty() {
        output::print_message("No projects found");
        return Ok(());
    }

    output::print_table(&projects, |p| ProjectRow::from(p), |p| {
        format!("{}\t{}", p.id, p.fields.title)
    });

    Ok(())
}

pub async fn view(api: &impl CatalogApi, views: &mut ViewCache, id: &Id) -> Result<()> {
    let project: Project = views
        .read_through(CacheKey::Project(id.clone()), || api.get_project(id))
        .await?;

    // An empty ids[] filter would return every record, so skip the call.
    let fields = &project.fields;
    let technologies = if fields.technologies.is_empty() {
        Vec::new()
    } else {
        api.list_technologies(&ListFilter::ids(&fields.technologies))
            .await?
    };
    let categories = if fields.categories.is_empty() {
        Vec::new()
    } else {
        api.list_categories(&ListFilter::ids(&fields.categories))
            .await?
    };
    let screenshots = if fields.screenshots.is_empty() {
        Vec::new()
    } else {
        api.list_screenshots(&ListFilter::ids(&fields.screenshots).ordered_by(DEFAULT_ORDERING))
            .await?
    };

    let detail = ProjectDetail {
        project,
        technology_names: technologies,
        category_titles: categories,
        screenshot_images: screenshots,
    };

    output::print_item(&detail, print_detail);

    Ok(())
}

fn print_detail(detail: &ProjectDetail) {
    let fields = &detail.project.fields;

    println!("{}", heading(&fields.title));
    println!("{} {}", "ID:".bold(), detail.project.id);
    println!("{} {}", "Priority:".bold(), fields.priority_order);
    println!("{} {}", "Live preview:".bold(), or_dash(&fields.live_preview));
    println!("{} {}", "Source code:".bold(), or_dash(&fields.source_code));

    if !fields.description.is_empty() {
        println!("\n{}", fields.description);
    }

    let names: Vec<_> = detail
        .technology_names
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    println!("\n{} {}", "Technologies:".bold(), or_dash(&names.join(", ")));

    let titles: Vec<_> = detail
        .category_titles
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    println!("{} {}", "Categories:".bold(), or_dash(&titles.join(", ")));

    if detail.screenshot_images.is_empty() {
        println!("{} {}", "Screenshots:".bold(), or_dash(""));
    } else {
        println!("{}", "Screenshots:".bold());
        for screenshot in &detail.screenshot_images {
            println!("  [{}] {}", screenshot.id, screenshot.image);
        }
    }
}

pub async fn create(
    api: &impl CatalogApi,
    views: &mut ViewCache,
    args: ProjectCreateArgs,
) -> Result<()> {
    let form = create_form(args)?;
    submit(api, views, form).await
}

pub async fn edit(api: &impl CatalogApi, views: &mut ViewCache, args: ProjectEditArgs) -> Result<()> {
    // Always start from the server copy; reconciliation diffs against it.
    let project = api.get_project(&args.id).await?;
    let mut form = ProjectForm::edit(project);
    apply_edits(&mut form, args)?;
    submit(api, views, form).await
}

fn create_form(args: ProjectCreateArgs) -> Result<ProjectForm> {
    let mut form = ProjectForm::create();
    form.inputs.title = args.title;
    form.inputs.description = args.description.unwrap_or_default();
    form.inputs.live_preview = args.live_preview.unwrap_or_default();
    form.inputs.source_code = args.source_code.unwrap_or_default();
    form.inputs.priority_order = args.priority_order.unwrap_or_default();

    for id in args.technologies {
        form.check(Association::Technologies, id);
    }
    for id in args.categories {
        form.check(Association::Categories, id);
    }
    for name in &args.new_technologies {
        form.add_technology(name);
    }
    for path in &args.screenshots {
        form.add_screenshot(ImageUpload::from_path(path)?);
    }

    Ok(form)
}

fn apply_edits(form: &mut ProjectForm, args: ProjectEditArgs) -> Result<()> {
    if let Some(title) = args.title {
        form.inputs.title = title;
    }
    if let Some(description) = args.description {
        form.inputs.description = description;
    }
    if let Some(live_preview) = args.live_preview {
        form.inputs.live_preview = live_preview;
    }
    if let Some(source_code) = args.source_code {
        form.inputs.source_code = source_code;
    }
    if let Some(priority_order) = args.priority_order {
        form.inputs.priority_order = priority_order;
    }

    for id in args.add_technology {
        form.check(Association::Technologies, id);
    }
    for id in &args.remove_technology {
        form.uncheck(Association::Technologies, id);
    }
    for name in &args.new_technologies {
        form.add_technology(name);
    }
    for id in args.add_category {
        form.check(Association::Categories, id);
    }
    for id in &args.remove_category {
        form.uncheck(Association::Categories, id);
    }
    for id in &args.remove_screenshot {
        form.uncheck(Association::Screenshots, id);
    }
    for path in &args.upload {
        form.add_screenshot(ImageUpload::from_path(path)?);
    }

    Ok(())
}

async fn submit(api: &impl CatalogApi, views: &mut ViewCache, mut form: ProjectForm) -> Result<()> {
    let verb = if form.project_id().is_some() {
        "Updated"
    } else {
        "Created"
    };
    let new_technologies = form.new_technologies().len();
    let new_screenshots = form.new_screenshots().len();

    let project = match form.submit(api, views).await {
        Ok(project) => project,
        Err(err) => {
            debug!(state = %form.state(), "project form left unsaved");
            return Err(err);
        }
    };

    let mut message = format!("{verb} project {} ({})", project.fields.title, project.id);
    if new_technologies > 0 || new_screenshots > 0 {
        message.push_str(&format!(
            ", {new_technologies} new technologies, {new_screenshots} new screenshots"
        ));
    }
    output::print_message(&message);

    Ok(())
}

pub async fn delete(api: &impl CatalogApi, views: &mut ViewCache, id: &Id, yes: bool) -> Result<()> {
    if !yes {
        let project: Project = views
            .read_through(CacheKey::Project(id.clone()), || api.get_project(id))
            .await?;

        if !confirm(&format!("Delete project \"{}\"?", project.fields.title))? {
            output::print_message("Aborted");
            return Ok(());
        }
    }

    api.delete_project(id).await?;
    views.invalidate_after(&Mutation::DeleteProject(id.clone()));
    output::print_message(&format!("Deleted project {id}"));

    Ok(())
}
