use std::collections::{BTreeSet, HashMap};

use indexmap::{IndexMap, IndexSet};
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::generator::{
  ast::{GeneratedModel, ModelField, ModelKind, TypeRef},
  error::GenerationError,
  metrics::GenerationWarning,
  resolver::ReferenceResolver,
  schema_graph::{Component, ObjectShape, SCHEMA_REF_PREFIX, SchemaNode},
  type_mapper::TypeMapper,
};

#[derive(Debug, Default)]
pub(crate) struct ComposedModels {
  pub(crate) models: Vec<GeneratedModel>,
  /// Groups of models that contain each other by value.
  pub(crate) cycles: Vec<Vec<String>>,
  pub(crate) warnings: Vec<GenerationWarning>,
}

/// Turns components into models, parents before children.
pub(crate) struct ModelComposer<'a> {
  components: &'a IndexMap<String, Component>,
  resolver: &'a ReferenceResolver<'a>,
  mapper: &'a TypeMapper<'a>,
  model_names: &'a HashMap<String, String>,
}

impl<'a> ModelComposer<'a> {
  pub(crate) fn new(
    components: &'a IndexMap<String, Component>,
    resolver: &'a ReferenceResolver<'a>,
    mapper: &'a TypeMapper<'a>,
    model_names: &'a HashMap<String, String>,
  ) -> Self {
    Self {
      components,
      resolver,
      mapper,
      model_names,
    }
  }

  pub(crate) fn compose(&self) -> Result<ComposedModels, GenerationError> {
    let order = self.emission_order()?;

    let mut warnings = vec![];
    let components: Vec<&'a Component> = order.iter().filter_map(|name| self.components.get(*name)).collect();
    let mut models: Vec<GeneratedModel> = components
      .iter()
      .map(|&component| self.build_model(component, &mut warnings))
      .collect();

    for index in recursive_aliases(&models) {
      let model = &mut models[index];
      warnings.push(GenerationWarning::unsupported(
        format!("{SCHEMA_REF_PREFIX}{}", components[index].name),
        format!("type alias {} expands into itself", model.name),
      ));
      model.kind = ModelKind::Alias(TypeRef::Dynamic);
    }

    let cycles = box_recursive_fields(&mut models);
    Ok(ComposedModels {
      models,
      cycles,
      warnings,
    })
  }

  /// Plain components in declaration order, then composites in declaration
  /// order with each parent chain placed ahead of its child.
  fn emission_order(&self) -> Result<Vec<&'a str>, GenerationError> {
    let mut emitted: IndexSet<&'a str> = self
      .components
      .iter()
      .filter(|(_, component)| !component.node.is_composite())
      .map(|(name, _)| name.as_str())
      .collect();

    for (name, component) in self.components {
      if component.node.is_composite() {
        let mut chain = vec![];
        self.visit(name, &mut chain, &mut emitted)?;
      }
    }

    Ok(emitted.into_iter().collect())
  }

  fn visit(
    &self,
    name: &'a str,
    chain: &mut Vec<&'a str>,
    emitted: &mut IndexSet<&'a str>,
  ) -> Result<(), GenerationError> {
    if emitted.contains(name) {
      return Ok(());
    }
    if chain.contains(&name) {
      let mut cycle: Vec<String> = chain.iter().map(ToString::to_string).collect();
      cycle.push(name.to_string());
      return Err(GenerationError::InheritanceCycle { chain: cycle });
    }

    chain.push(name);
    if let Some(Component {
      node: SchemaNode::Composite { parent, .. },
      ..
    }) = self.components.get(name)
    {
      let location = format!("#/components/schemas/{name}/allOf");
      let parent_name = self
        .resolver
        .resolve(parent)
        .map_err(|_| GenerationError::unresolved(parent, location))?;
      let (parent_key, _) = self
        .components
        .get_key_value(parent_name)
        .ok_or_else(|| GenerationError::unresolved(parent, name))?;
      self.visit(parent_key.as_str(), chain, emitted)?;
    }
    chain.pop();

    emitted.insert(name);
    Ok(())
  }

  fn build_model(&self, component: &'a Component, warnings: &mut Vec<GenerationWarning>) -> GeneratedModel {
    let name = self
      .model_names
      .get(&component.name)
      .cloned()
      .unwrap_or_else(|| component.name.clone());
    let doc_comment = component.description.clone().unwrap_or_default();

    match &component.node {
      SchemaNode::Object(shape) => GeneratedModel::builder()
        .name(name)
        .fields(self.fields(shape))
        .doc_comment(doc_comment)
        .build(),
      SchemaNode::Composite { parent, extra } => {
        let parent_name = if self.is_struct_parent(parent) {
          self.mapper.model_name(parent)
        } else {
          warnings.push(GenerationWarning::unsupported(
            format!("{SCHEMA_REF_PREFIX}{}/allOf", component.name),
            format!("parent '{parent}' is not an object schema, inheritance dropped"),
          ));
          None
        };
        GeneratedModel::builder()
          .name(name)
          .maybe_parent_name(parent_name)
          .fields(self.fields(extra))
          .doc_comment(doc_comment)
          .build()
      }
      other => GeneratedModel::builder()
        .name(name)
        .doc_comment(doc_comment)
        .kind(ModelKind::Alias(self.mapper.map(other)))
        .build(),
    }
  }

  /// Only structs can be flattened into a child. Plain references are
  /// followed to the schema they name.
  fn is_struct_parent(&self, pointer: &'a str) -> bool {
    let mut seen = BTreeSet::new();
    let mut pointer = pointer;
    while seen.insert(pointer) {
      match self.resolver.component(pointer).map(|component| &component.node) {
        Some(SchemaNode::Object(_) | SchemaNode::Composite { .. }) => return true,
        Some(SchemaNode::Reference(next)) => pointer = next.as_str(),
        _ => return false,
      }
    }
    false
  }

  fn fields(&self, shape: &ObjectShape) -> Vec<ModelField> {
    shape
      .properties
      .iter()
      .map(|(name, node)| {
        ModelField::builder()
          .name(name.clone())
          .type_ref(self.mapper.map(node))
          .optional(!shape.is_required(name))
          .build()
      })
      .collect()
  }
}

/// Indices of aliases whose expansion reaches themselves through other
/// aliases, e.g. `Tree = Vec<Tree>`. Rust rejects those as `type` items.
fn recursive_aliases(models: &[GeneratedModel]) -> BTreeSet<usize> {
  let mut graph = DiGraphMap::<&str, ()>::new();
  for model in models {
    if let ModelKind::Alias(target) = &model.kind {
      graph.add_node(model.name.as_str());
      if let Some(target) = target.named_target() {
        graph.add_edge(model.name.as_str(), target, ());
      }
    }
  }

  // Only aliases have outgoing edges, so a cycle never passes through a struct.
  let recursive: BTreeSet<&str> = kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .flatten()
    .collect();

  models
    .iter()
    .enumerate()
    .filter(|(_, model)| recursive.contains(model.name.as_str()))
    .map(|(index, _)| index)
    .collect()
}

/// Marks fields that hold a model of their own strongly connected component
/// by value, so the emitted structs have a finite size. Sequences already
/// allocate and are left alone.
fn box_recursive_fields(models: &mut [GeneratedModel]) -> Vec<Vec<String>> {
  let mut graph = DiGraphMap::<&str, ()>::new();
  for model in models.iter() {
    graph.add_node(model.name.as_str());
    for target in direct_targets(model) {
      graph.add_edge(model.name.as_str(), target, ());
    }
  }

  let cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .map(|scc| scc.into_iter().map(String::from).collect())
    .collect();

  let component_of: HashMap<&str, usize> = cycles
    .iter()
    .enumerate()
    .flat_map(|(index, scc)| scc.iter().map(move |name| (name.as_str(), index)))
    .collect();

  let mut to_box: BTreeSet<(usize, usize)> = BTreeSet::new();
  for (model_index, model) in models.iter().enumerate() {
    let Some(own) = component_of.get(model.name.as_str()) else {
      continue;
    };
    for (field_index, field) in model.fields.iter().enumerate() {
      if let TypeRef::Named(target) = &field.type_ref
        && component_of.get(target.as_str()) == Some(own)
      {
        to_box.insert((model_index, field_index));
      }
    }
  }

  for (model_index, field_index) in to_box {
    models[model_index].fields[field_index].boxed = true;
  }

  cycles
}

fn direct_targets(model: &GeneratedModel) -> Vec<&str> {
  match &model.kind {
    ModelKind::Alias(TypeRef::Named(target)) => vec![target.as_str()],
    ModelKind::Alias(_) => vec![],
    ModelKind::Struct => model
      .parent_name
      .iter()
      .map(String::as_str)
      .chain(model.fields.iter().filter_map(|field| match &field.type_ref {
        TypeRef::Named(target) => Some(target.as_str()),
        _ => None,
      }))
      .collect(),
  }
}
