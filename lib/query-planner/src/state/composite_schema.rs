use std::sync::Arc;

use graphql_parser::schema as input;
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::ast::field_path::FieldPath;
use crate::ast::operation::OperationKind;
use crate::ast::selection_set::SelectionSet;
use crate::ast::type_node::TypeNode;
use crate::state::composition_error::{CompositionDiagnostic, CompositionError};
use crate::state::directives::{
    extract_directives, FieldSourceDirective, LookupDirective, RequiresDirective, SchemaDirective,
    TypeSourceDirective,
};
use crate::state::metadata::{FieldRequirements, Lookup, LookupArgument, RequirementArgument};
use crate::utils::operation_utils::convert_selection_set_body;
use crate::utils::parsing::SchemaDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchemaInfo {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeTypeKind {
    Object,
    Interface,
}

/// Per-(type, schema) source metadata: the lookups available to jump into the
/// schema for this type.
#[derive(Debug, Default, Clone)]
pub struct TypeSource {
    pub lookups: Vec<Arc<Lookup>>,
}

/// Per-(field, schema) source metadata.
#[derive(Debug, Default, Clone)]
pub struct FieldSource {
    pub requirements: Option<Arc<FieldRequirements>>,
}

#[derive(Debug, Clone)]
pub struct CompositeField {
    pub name: String,
    pub field_type: TypeNode,
    /// Argument names exposed to clients on the composite schema. Arguments a
    /// source schema needs beyond these are requirements.
    pub argument_names: Vec<String>,
    pub sources: FxHashMap<String, FieldSource>,
}

impl CompositeField {
    pub fn is_resolvable_by(&self, schema_name: &str) -> bool {
        self.sources.contains_key(schema_name)
    }

    pub fn requirements_in(&self, schema_name: &str) -> Option<&Arc<FieldRequirements>> {
        self.sources
            .get(schema_name)
            .and_then(|source| source.requirements.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct CompositeType {
    pub name: String,
    pub kind: CompositeTypeKind,
    pub fields: FxHashMap<String, CompositeField>,
    pub sources: FxHashMap<String, TypeSource>,
}

impl CompositeType {
    pub fn field(&self, name: &str) -> Option<&CompositeField> {
        self.fields.get(name)
    }

    pub fn lookups(&self, schema_name: &str) -> &[Arc<Lookup>] {
        self.sources
            .get(schema_name)
            .map(|source| source.lookups.as_slice())
            .unwrap_or_default()
    }
}

/// The composite schema metadata the planner consumes: which source schemas
/// expose which types and fields, which lookups exist per (type, schema), and
/// which fields carry argument requirements.
///
/// Built once at schema load time from the annotated composite SDL that the
/// composition phase emits; read-only afterwards.
#[derive(Debug)]
pub struct CompositeSchemaState {
    pub schemas: FxHashMap<String, SourceSchemaInfo>,
    pub types: FxHashMap<String, CompositeType>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl CompositeSchemaState {
    #[instrument(level = "debug", skip(document), name = "new_composite_schema_state")]
    pub fn try_new(document: &SchemaDocument) -> Result<Self, CompositionError> {
        let mut diagnostics = Vec::new();
        let mut builder = StateBuilder::default();

        builder.collect_roots_and_schemas(document, &mut diagnostics);
        builder.collect_types(document, &mut diagnostics);
        builder.validate(&mut diagnostics);

        if !diagnostics.is_empty() {
            return Err(CompositionError { diagnostics });
        }

        Ok(builder.state)
    }

    pub fn root_type_name(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn type_def(&self, name: &str) -> Option<&CompositeType> {
        self.types.get(name)
    }

    pub fn schema_exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}

#[derive(Default)]
struct StateBuilder {
    state: CompositeSchemaState,
}

impl Default for CompositeSchemaState {
    fn default() -> Self {
        Self {
            schemas: FxHashMap::default(),
            types: FxHashMap::default(),
            query_type: None,
            mutation_type: None,
            subscription_type: None,
        }
    }
}

impl StateBuilder {
    fn collect_roots_and_schemas(
        &mut self,
        document: &SchemaDocument,
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) {
        for definition in &document.definitions {
            let input::Definition::SchemaDefinition(schema_definition) = definition else {
                continue;
            };

            self.state.query_type = schema_definition.query.clone();
            self.state.mutation_type = schema_definition.mutation.clone();
            self.state.subscription_type = schema_definition.subscription.clone();

            for directive in extract_directives::<SchemaDirective>(&schema_definition.directives) {
                let Some(name) = directive.name else {
                    diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                        argument: "name".to_string(),
                        location: "schema".to_string(),
                    });
                    continue;
                };

                let info = SourceSchemaInfo {
                    name: name.clone(),
                    url: directive.url,
                };

                if self.state.schemas.insert(name.clone(), info).is_some() {
                    diagnostics.push(CompositionDiagnostic::DuplicateSchema(name));
                }
            }
        }

        // Conventional default root names when no schema definition exists.
        if self.state.query_type.is_none() {
            self.state.query_type = Some("Query".to_string());
        }
        if self.state.mutation_type.is_none() {
            self.state.mutation_type = Some("Mutation".to_string());
        }
        if self.state.subscription_type.is_none() {
            self.state.subscription_type = Some("Subscription".to_string());
        }
    }

    fn collect_types(
        &mut self,
        document: &SchemaDocument,
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) {
        for definition in &document.definitions {
            let input::Definition::TypeDefinition(type_definition) = definition else {
                continue;
            };

            match type_definition {
                input::TypeDefinition::Object(object_type) => {
                    let composite_type = self.build_complex_type(
                        &object_type.name,
                        CompositeTypeKind::Object,
                        &object_type.directives,
                        &object_type.fields,
                        diagnostics,
                    );
                    self.state
                        .types
                        .insert(object_type.name.clone(), composite_type);
                }
                input::TypeDefinition::Interface(interface_type) => {
                    let composite_type = self.build_complex_type(
                        &interface_type.name,
                        CompositeTypeKind::Interface,
                        &interface_type.directives,
                        &interface_type.fields,
                        diagnostics,
                    );
                    self.state
                        .types
                        .insert(interface_type.name.clone(), composite_type);
                }
                // Scalars, enums, unions and input objects carry no
                // planner-relevant source metadata.
                _ => {}
            }
        }
    }

    fn build_complex_type(
        &self,
        type_name: &str,
        kind: CompositeTypeKind,
        directives: &[input::Directive<'static, String>],
        fields: &[input::Field<'static, String>],
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) -> CompositeType {
        let mut sources: FxHashMap<String, TypeSource> = FxHashMap::default();

        for directive in extract_directives::<TypeSourceDirective>(directives) {
            let Some(schema) = directive.schema else {
                diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                    argument: "schema".to_string(),
                    location: type_name.to_string(),
                });
                continue;
            };

            self.check_schema_reference(&schema, type_name, diagnostics);
            sources.entry(schema).or_default();
        }

        for directive in extract_directives::<LookupDirective>(directives) {
            if let Some(lookup) = self.build_lookup(type_name, directive, diagnostics) {
                sources
                    .entry(lookup.schema_name.clone())
                    .or_default()
                    .lookups
                    .push(Arc::new(lookup));
            }
        }

        let mut composite_fields = FxHashMap::default();
        for field in fields {
            let location = format!("{}.{}", type_name, field.name);
            composite_fields.insert(
                field.name.clone(),
                self.build_field(field, &location, diagnostics),
            );
        }

        CompositeType {
            name: type_name.to_string(),
            kind,
            fields: composite_fields,
            sources,
        }
    }

    fn build_field(
        &self,
        field: &input::Field<'static, String>,
        location: &str,
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) -> CompositeField {
        let mut sources: FxHashMap<String, FieldSource> = FxHashMap::default();

        for directive in extract_directives::<FieldSourceDirective>(&field.directives) {
            let Some(schema) = directive.schema else {
                diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                    argument: "schema".to_string(),
                    location: location.to_string(),
                });
                continue;
            };

            self.check_schema_reference(&schema, location, diagnostics);
            sources.entry(schema).or_default();
        }

        for directive in extract_directives::<RequiresDirective>(&field.directives) {
            let Some(schema) = directive.schema.clone() else {
                diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                    argument: "schema".to_string(),
                    location: location.to_string(),
                });
                continue;
            };

            self.check_schema_reference(&schema, location, diagnostics);

            let Some(source) = sources.get_mut(&schema) else {
                diagnostics.push(CompositionDiagnostic::RequirementForForeignSchema {
                    schema,
                    location: location.to_string(),
                });
                continue;
            };

            let Some(requirement) = build_requirement_argument(&directive, location, diagnostics)
            else {
                continue;
            };

            let selections = match &directive.selection {
                Some(selection) => {
                    parse_selection_body(selection, location, diagnostics).unwrap_or_default()
                }
                None => requirement
                    .map
                    .as_ref()
                    .map(|map| map.to_selection_set())
                    .unwrap_or_default(),
            };

            match &mut source.requirements {
                Some(existing) => {
                    let merged = Arc::make_mut(existing);
                    merged.selections =
                        crate::ast::merge::merge_selection_sets(&merged.selections, &selections);
                    merged.arguments.push(requirement);
                }
                none => {
                    *none = Some(Arc::new(FieldRequirements {
                        arguments: vec![requirement],
                        selections,
                    }));
                }
            }
        }

        if sources.is_empty() {
            diagnostics.push(CompositionDiagnostic::FieldWithoutSources {
                location: location.to_string(),
            });
        }

        CompositeField {
            name: field.name.clone(),
            field_type: (&field.field_type).into(),
            argument_names: field.arguments.iter().map(|arg| arg.name.clone()).collect(),
            sources,
        }
    }

    fn build_lookup(
        &self,
        type_name: &str,
        directive: LookupDirective,
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) -> Option<Lookup> {
        let location = type_name.to_string();

        let Some(schema) = directive.schema else {
            diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                argument: "schema".to_string(),
                location,
            });
            return None;
        };

        self.check_schema_reference(&schema, &location, diagnostics);

        let Some(field_name) = directive.field else {
            diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                argument: "field".to_string(),
                location,
            });
            return None;
        };

        let Some(key) = directive.key else {
            diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                argument: "key".to_string(),
                location,
            });
            return None;
        };

        let key_selections = parse_selection_body(&key, &location, diagnostics)?;

        let mut arguments = Vec::with_capacity(directive.arguments.len());
        for argument in directive.arguments {
            let (Some(name), Some(raw_type), Some(raw_map)) =
                (argument.name, argument.argument_type, argument.map)
            else {
                diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
                    argument: "arguments".to_string(),
                    location: location.clone(),
                });
                return None;
            };

            let Some(argument_type) = TypeNode::parse_str(&raw_type) else {
                diagnostics.push(CompositionDiagnostic::InvalidTypeReference {
                    value: raw_type,
                    location: location.clone(),
                });
                return None;
            };

            let Some(map) = FieldPath::parse(&raw_map) else {
                diagnostics.push(CompositionDiagnostic::InvalidFieldPath {
                    value: raw_map,
                    location: location.clone(),
                });
                return None;
            };

            arguments.push(LookupArgument {
                name,
                argument_type,
                map,
            });
        }

        Some(Lookup {
            schema_name: schema,
            field_name,
            arguments,
            key_selections,
        })
    }

    fn check_schema_reference(
        &self,
        schema: &str,
        location: &str,
        diagnostics: &mut Vec<CompositionDiagnostic>,
    ) {
        if !self.state.schemas.contains_key(schema) {
            diagnostics.push(CompositionDiagnostic::UnknownSchemaReference {
                schema: schema.to_string(),
                location: location.to_string(),
            });
        }
    }

    fn validate(&self, diagnostics: &mut Vec<CompositionDiagnostic>) {
        let has_query_root = self
            .state
            .query_type
            .as_deref()
            .is_some_and(|name| self.state.types.contains_key(name));

        if !has_query_root {
            diagnostics.push(CompositionDiagnostic::MissingQueryRoot);
        }
    }
}

fn build_requirement_argument(
    directive: &RequiresDirective,
    location: &str,
    diagnostics: &mut Vec<CompositionDiagnostic>,
) -> Option<RequirementArgument> {
    let Some(name) = directive.argument.clone() else {
        diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
            argument: "argument".to_string(),
            location: location.to_string(),
        });
        return None;
    };

    let Some(raw_type) = directive.argument_type.clone() else {
        diagnostics.push(CompositionDiagnostic::MissingDirectiveArgument {
            argument: "type".to_string(),
            location: location.to_string(),
        });
        return None;
    };

    let Some(argument_type) = TypeNode::parse_str(&raw_type) else {
        diagnostics.push(CompositionDiagnostic::InvalidTypeReference {
            value: raw_type,
            location: location.to_string(),
        });
        return None;
    };

    let map = match &directive.map {
        Some(raw_map) => match FieldPath::parse(raw_map) {
            Some(map) => Some(map),
            None => {
                diagnostics.push(CompositionDiagnostic::InvalidFieldPath {
                    value: raw_map.clone(),
                    location: location.to_string(),
                });
                return None;
            }
        },
        None => None,
    };

    Some(RequirementArgument {
        name,
        argument_type,
        map,
    })
}

fn parse_selection_body(
    body: &str,
    location: &str,
    diagnostics: &mut Vec<CompositionDiagnostic>,
) -> Option<SelectionSet> {
    let wrapped = format!("{{ {} }}", body);

    let document = match graphql_parser::parse_query::<String>(&wrapped) {
        Ok(document) => document.into_static(),
        Err(_) => {
            diagnostics.push(CompositionDiagnostic::InvalidSelection {
                value: body.to_string(),
                location: location.to_string(),
            });
            return None;
        }
    };

    let selection_set = document.definitions.iter().find_map(|definition| {
        match definition {
            graphql_parser::query::Definition::Operation(
                graphql_parser::query::OperationDefinition::SelectionSet(selection_set),
            ) => Some(selection_set),
            _ => None,
        }
    })?;

    match convert_selection_set_body(selection_set) {
        Ok(converted) => Some(converted),
        Err(_) => {
            diagnostics.push(CompositionDiagnostic::InvalidSelection {
                value: body.to_string(),
                location: location.to_string(),
            });
            None
        }
    }
}
