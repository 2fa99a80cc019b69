use std::fmt::Display;

/// A single problem found while building the composite schema state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompositionDiagnostic {
    #[error("source schema '{0}' is declared more than once")]
    DuplicateSchema(String),
    #[error("'{location}' references undeclared source schema '{schema}'")]
    UnknownSchemaReference { schema: String, location: String },
    #[error("'{location}' has an invalid type reference '{value}'")]
    InvalidTypeReference { value: String, location: String },
    #[error("'{location}' has an invalid field selection map '{value}'")]
    InvalidFieldPath { value: String, location: String },
    #[error("'{location}' has an unparsable selection '{value}'")]
    InvalidSelection { value: String, location: String },
    #[error("'{location}' is missing the '{argument}' argument")]
    MissingDirectiveArgument { argument: String, location: String },
    #[error("field '{location}' is not resolvable by any source schema")]
    FieldWithoutSources { location: String },
    #[error("'{location}' declares requirements for schema '{schema}' which does not resolve the field")]
    RequirementForForeignSchema { schema: String, location: String },
    #[error("the composite schema does not define a query root type")]
    MissingQueryRoot,
}

/// Composition fails as a whole; every diagnostic that was found is reported,
/// not just the first one, so operators can fix all issues at once.
#[derive(Debug, Clone, thiserror::Error)]
pub struct CompositionError {
    pub diagnostics: Vec<CompositionDiagnostic>,
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "schema composition failed with {} diagnostic(s):",
            self.diagnostics.len()
        )?;
        for diagnostic in &self.diagnostics {
            writeln!(f, "  - {}", diagnostic)?;
        }
        Ok(())
    }
}
