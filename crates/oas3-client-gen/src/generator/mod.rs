pub(crate) mod ast;
pub(crate) mod codegen;
pub(crate) mod error;
pub(crate) mod lowering;
pub(crate) mod metrics;
pub(crate) mod model_composer;
pub(crate) mod naming;
pub(crate) mod operation_synthesizer;
pub mod orchestrator;
pub(crate) mod resolver;
pub(crate) mod schema_graph;
pub(crate) mod type_mapper;

#[cfg(test)]
mod tests;
