use std::fmt::Display;

use graphql_parser::schema::Type as ParserType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeNode {
    Named(String),
    List(Box<TypeNode>),
    NonNull(Box<TypeNode>),
}

impl TypeNode {
    /// The innermost named type of this type reference.
    pub fn named_type(&self) -> &str {
        match self {
            TypeNode::Named(name) => name,
            TypeNode::List(inner) => inner.named_type(),
            TypeNode::NonNull(inner) => inner.named_type(),
        }
    }

    /// Parses a type reference string such as `[ID!]!`.
    pub fn parse_str(input: &str) -> Option<TypeNode> {
        let input = input.trim();

        if let Some(stripped) = input.strip_suffix('!') {
            return Some(TypeNode::NonNull(Box::new(Self::parse_str(stripped)?)));
        }

        if let Some(stripped) = input.strip_prefix('[') {
            let stripped = stripped.strip_suffix(']')?;
            return Some(TypeNode::List(Box::new(Self::parse_str(stripped)?)));
        }

        if input.is_empty() || !input.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }

        Some(TypeNode::Named(input.to_string()))
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Named(name) => write!(f, "{}", name),
            TypeNode::List(inner) => write!(f, "[{}]", inner),
            TypeNode::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

impl From<&ParserType<'_, String>> for TypeNode {
    fn from(value: &ParserType<'_, String>) -> Self {
        match value {
            ParserType::NamedType(name) => TypeNode::Named(name.clone()),
            ParserType::ListType(inner) => TypeNode::List(Box::new(inner.as_ref().into())),
            ParserType::NonNullType(inner) => TypeNode::NonNull(Box::new(inner.as_ref().into())),
        }
    }
}
