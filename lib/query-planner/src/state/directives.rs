use graphql_parser::schema::{Directive, Value};

/// Typed views over the `source__*` directives that a composition tool leaves
/// on the composite schema document. Values are kept raw here; resolution and
/// validation happen when the composite schema state is built.
pub trait SourceDirective<'a> {
    fn directive_name() -> &'a str;

    fn is(directive: &Directive<'_, String>) -> bool {
        Self::directive_name() == directive.name
    }

    fn parse(directive: &Directive<'_, String>) -> Self
    where
        Self: Sized;
}

pub fn extract_directives<'a, T: SourceDirective<'a>>(
    directives: &[Directive<'_, String>],
) -> Vec<T> {
    directives.iter().filter(|d| T::is(d)).map(T::parse).collect()
}

fn string_arg(directive: &Directive<'_, String>, name: &str) -> Option<String> {
    directive.arguments.iter().find_map(|(arg_name, value)| {
        if arg_name != name {
            return None;
        }
        match value {
            Value::String(value) => Some(value.clone()),
            Value::Enum(value) => Some(value.clone()),
            _ => None,
        }
    })
}

/// `schema @source__schema(name: "a", url: "http://a/graphql")`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaDirective {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl<'a> SourceDirective<'a> for SchemaDirective {
    fn directive_name() -> &'a str {
        "source__schema"
    }

    fn parse(directive: &Directive<'_, String>) -> Self {
        Self {
            name: string_arg(directive, "name"),
            url: string_arg(directive, "url"),
        }
    }
}

/// `type Product @source__type(schema: "a")`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeSourceDirective {
    pub schema: Option<String>,
}

impl<'a> SourceDirective<'a> for TypeSourceDirective {
    fn directive_name() -> &'a str {
        "source__type"
    }

    fn parse(directive: &Directive<'_, String>) -> Self {
        Self {
            schema: string_arg(directive, "schema"),
        }
    }
}

/// `name: String @source__field(schema: "a")`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldSourceDirective {
    pub schema: Option<String>,
}

impl<'a> SourceDirective<'a> for FieldSourceDirective {
    fn directive_name() -> &'a str {
        "source__field"
    }

    fn parse(directive: &Directive<'_, String>) -> Self {
        Self {
            schema: string_arg(directive, "schema"),
        }
    }
}

/// One argument of a lookup entry point, as declared inside the `arguments`
/// list of `@source__lookup`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupArgumentDirective {
    pub name: Option<String>,
    pub argument_type: Option<String>,
    pub map: Option<String>,
}

/// `type Product @source__lookup(schema: "b", field: "productById",
///    arguments: [{name: "id", type: "ID!", map: "id"}], key: "id")`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupDirective {
    pub schema: Option<String>,
    pub field: Option<String>,
    pub arguments: Vec<LookupArgumentDirective>,
    pub key: Option<String>,
}

impl<'a> SourceDirective<'a> for LookupDirective {
    fn directive_name() -> &'a str {
        "source__lookup"
    }

    fn parse(directive: &Directive<'_, String>) -> Self {
        let mut result = Self {
            schema: string_arg(directive, "schema"),
            field: string_arg(directive, "field"),
            key: string_arg(directive, "key"),
            arguments: Vec::new(),
        };

        if let Some((_, Value::List(entries))) = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "arguments")
        {
            for entry in entries {
                if let Value::Object(object) = entry {
                    result.arguments.push(LookupArgumentDirective {
                        name: object.get("name").and_then(value_as_string),
                        argument_type: object.get("type").and_then(value_as_string),
                        map: object.get("map").and_then(value_as_string),
                    });
                }
            }
        }

        result
    }
}

/// `shippingEstimate(size: Int): Int @source__requires(schema: "b",
///    argument: "size", type: "Int!", map: "dimensions.size",
///    selection: "dimensions { size }")`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequiresDirective {
    pub schema: Option<String>,
    pub argument: Option<String>,
    pub argument_type: Option<String>,
    pub map: Option<String>,
    pub selection: Option<String>,
}

impl<'a> SourceDirective<'a> for RequiresDirective {
    fn directive_name() -> &'a str {
        "source__requires"
    }

    fn parse(directive: &Directive<'_, String>) -> Self {
        Self {
            schema: string_arg(directive, "schema"),
            argument: string_arg(directive, "argument"),
            argument_type: string_arg(directive, "type"),
            map: string_arg(directive, "map"),
            selection: string_arg(directive, "selection"),
        }
    }
}

fn value_as_string(value: &Value<'_, String>) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Enum(value) => Some(value.clone()),
        _ => None,
    }
}
