use graphql_parser::query::ParseError;

pub type SchemaDocument = graphql_parser::schema::Document<'static, String>;
pub type QueryDocument = graphql_parser::query::Document<'static, String>;

#[inline]
pub fn parse_operation(operation: &str) -> QueryDocument {
    graphql_parser::parse_query(operation).unwrap().into_static()
}

#[inline]
pub fn safe_parse_operation(operation: &str) -> Result<QueryDocument, ParseError> {
    graphql_parser::parse_query(operation).map(|op| op.into_static())
}

#[inline]
pub fn safe_parse_schema(sdl: &str) -> Result<SchemaDocument, graphql_parser::schema::ParseError> {
    graphql_parser::parse_schema(sdl).map(|doc| doc.into_static())
}
