pub mod composite_schema;
pub mod composition_error;
pub mod directives;
pub mod metadata;
