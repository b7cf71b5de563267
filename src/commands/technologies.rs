use tabled::Tabled;

use crate::cache::{CacheKey, ViewCache};
use crate::error::Result;
use crate::output;
use crate::resources::{CatalogApi, ListFilter};
use crate::types::Technology;

#[derive(Tabled)]
struct TechnologyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Technology> for TechnologyRow {
    fn from(technology: &Technology) -> Self {
        Self {
            id: technology.id.to_string(),
            name: technology.name.clone(),
        }
    }
}

pub async fn list(api: &impl CatalogApi, views: &mut ViewCache) -> Result<()> {
    let filter = ListFilter::default();
    let technologies: Vec<Technology> = views
        .read_through(CacheKey::Technologies, || api.list_technologies(&filter))
        .await?;

    if technologies.is_empty() {
        output::print_message("No technologies found");
        return Ok(());
    }

    output::print_table(&technologies, |t| TechnologyRow::from(t), |t| {
        format!("{}\t{}", t.id, t.name)
    });

    Ok(())
}
