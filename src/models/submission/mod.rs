pub mod queries;
pub mod schema;
pub mod types;

pub use queries::*;
pub use schema::{FieldKind, FieldSpec, FormSchema};
pub use types::*;
