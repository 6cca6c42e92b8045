use std::path::Path;

use serde_json::Value;

use crate::utils::SpecLoader;

pub mod generate;
pub mod list;
pub mod validate;

pub use generate::{GenerateConfig, generate_code};
pub use list::list_operations;
pub use validate::validate_spec;

async fn load_document(path: &Path) -> anyhow::Result<Value> {
  SpecLoader::open(path).await?.parse()
}
