pub mod spec;
pub mod validation;

pub use spec::SpecLoader;
pub use validation::{ValidationVerdict, validate_document};
