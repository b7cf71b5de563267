use tabled::Tabled;

use crate::cache::{CacheKey, ViewCache};
use crate::error::Result;
use crate::output::{self, truncate};
use crate::resources::{CatalogApi, ListFilter};
use crate::types::Screenshot;

#[derive(Tabled)]
pub(crate) struct ScreenshotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Project")]
    project: String,
}

impl From<&Screenshot> for ScreenshotRow {
    fn from(screenshot: &Screenshot) -> Self {
        Self {
            id: screenshot.id.to_string(),
            image: truncate(&screenshot.image, 60),
            priority: screenshot
                .priority_order
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            project: screenshot
                .project
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn list(api: &impl CatalogApi, views: &mut ViewCache) -> Result<()> {
    let filter = ListFilter::default().ordered_by("priority_order");
    let screenshots: Vec<Screenshot> = views
        .read_through(CacheKey::Screenshots, || api.list_screenshots(&filter))
        .await?;

    if screenshots.is_empty() {
        output::print_message("No screenshots found");
        return Ok(());
    }

    output::print_table(&screenshots, |s| ScreenshotRow::from(s), |s| {
        format!("{}\t{}", s.id, s.image)
    });

    Ok(())
}
