use thiserror::Error;

/// Failures that abort a generation pass. Nothing is emitted when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error("unresolved reference '{pointer}' at {location}")]
  UnresolvedReference { pointer: String, location: String },

  #[error("inheritance cycle: {}", chain.join(" -> "))]
  InheritanceCycle { chain: Vec<String> },

  #[error("invalid document: {message}")]
  InvalidDocument { message: String },
}

impl GenerationError {
  pub(crate) fn unresolved(pointer: impl Into<String>, location: impl Into<String>) -> Self {
    Self::UnresolvedReference {
      pointer: pointer.into(),
      location: location.into(),
    }
  }

  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    Self::InvalidDocument {
      message: message.into(),
    }
  }
}
