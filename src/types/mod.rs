mod category;
mod id;
mod project;
mod screenshot;
mod technology;

pub use category::Category;
pub use id::{join_ids, Id};
pub use project::{Project, ProjectPayload};
pub use screenshot::{ImageUpload, Screenshot};
pub use technology::{Technology, TechnologyDraft};
