use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use super::load_document;
use crate::{
  generator::{
    codegen::GenerationUnit,
    orchestrator::{GeneratorConfig, Orchestrator},
  },
  ui::{
    Colors,
    colors::table_color,
    term_width,
  },
};

fn operations_table(unit: &GenerationUnit, colors: &Colors) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  for title in ["METHOD", "VERB", "PATH"] {
    header.add_cell(Cell::new(title).fg(table_color(colors.label())));
  }
  table.set_header(header);

  for method in &unit.methods {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&method.name)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(method.verb.as_str())
        .fg(table_color(colors.verb(&method.verb)))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(method.path_template.as_str()).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  table
}

/// Prints the client methods in document order, named as they will be
/// generated.
pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let document = load_document(input).await?;
  let (unit, _) = Orchestrator::new(document, GeneratorConfig::default()).plan(&input.display().to_string())?;

  println!("{}", operations_table(&unit, colors));
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::colors::Theme;

  #[test]
  fn test_table_lists_methods_in_document_order() {
    let document: serde_json::Value = serde_json::json!({
      "openapi": "3.0.0",
      "info": { "title": "Pets", "version": "1" },
      "paths": {
        "/pets": {
          "get": { "operationId": "listPets", "responses": {} },
          "post": { "operationId": "createPet", "responses": {} }
        },
        "/pets/{id}": {
          "delete": { "responses": {} }
        }
      }
    });
    let (unit, _) = Orchestrator::new(document, GeneratorConfig::default()).plan("pets.json").unwrap();

    let mut table = operations_table(&unit, &Colors::new(false, Theme::Dark));
    table.set_width(120);
    let rendered = table.to_string();

    let list = rendered.find("list_pets").unwrap();
    let create = rendered.find("create_pet").unwrap();
    let delete = rendered.find("/pets/{id}").unwrap();
    assert!(list < create && create < delete);
    assert!(rendered.contains("DELETE"));
  }
}
