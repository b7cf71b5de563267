use tabled::Tabled;

use crate::cache::{CacheKey, ViewCache};
use crate::error::Result;
use crate::output;
use crate::resources::{CatalogApi, ListFilter};
use crate::types::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: i64,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            title: category.title.clone(),
            priority: category.priority_order,
        }
    }
}

pub async fn list(api: &impl CatalogApi, views: &mut ViewCache) -> Result<()> {
    let filter = ListFilter::default().ordered_by("priority_order");
    let categories: Vec<Category> = views
        .read_through(CacheKey::Categories, || api.list_categories(&filter))
        .await?;

    if categories.is_empty() {
        output::print_message("No categories found");
        return Ok(());
    }

    output::print_table(&categories, |c| CategoryRow::from(c), |c| {
        format!("{}\t{}", c.id, c.title)
    });

    Ok(())
}
