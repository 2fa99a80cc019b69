use crate::ast::field_path::FieldPath;
use crate::ast::selection_set::SelectionSet;
use crate::ast::type_node::TypeNode;

/// A schema-specific entity entry point for a type: how to fetch an instance
/// of the type by key values that are already known from prior results.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub schema_name: String,
    /// The root field of the lookup query in the source schema.
    pub field_name: String,
    pub arguments: Vec<LookupArgument>,
    /// The key fields that must be available before the lookup can run.
    pub key_selections: SelectionSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupArgument {
    pub name: String,
    pub argument_type: TypeNode,
    /// How the argument value is extracted from the object being looked up.
    pub map: FieldPath,
}

/// Declares that a field's arguments in one schema must be bound from data
/// that is only available elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequirements {
    pub arguments: Vec<RequirementArgument>,
    /// The selections that must be fetched to bind the arguments.
    pub selections: SelectionSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequirementArgument {
    pub name: String,
    pub argument_type: TypeNode,
    /// `None` when the argument is exposed on the composite schema and comes
    /// from the client rather than from a prior step's result.
    pub map: Option<FieldPath>,
}
