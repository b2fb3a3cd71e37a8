//! CrudService: descriptor-driven CRUD over the safe SQL builder, plus input normalization and validation.

mod crud;
pub mod normalize;
mod validation;
pub use crud::CrudService;
pub use normalize::{normalize_form, normalize_json, Values};
pub use validation::RequestValidator;
