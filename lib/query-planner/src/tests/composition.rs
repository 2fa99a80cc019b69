use crate::planner::{Planner, PlannerError};
use crate::tests::testkit::init_logger;

#[test]
fn every_composition_problem_is_reported_at_once() {
    init_logger();
    let result = Planner::new_from_sdl(
        r#"
        schema @source__schema(name: "a", url: "http://a/graphql") {
          query: Query
        }

        type Query @source__type(schema: "a") {
          product: Product @source__field(schema: "missing")
          other: String
        }

        type Product @source__type(schema: "a") {
          id: ID! @source__field(schema: "a")
        }
        "#,
    );

    let Err(PlannerError::Composition(error)) = result else {
        panic!("expected a composition error");
    };

    assert_eq!(error.diagnostics.len(), 2);
    let message = error.to_string();
    assert!(message.contains("2 diagnostic(s)"));
    assert!(message.contains("undeclared source schema 'missing'"));
    assert!(message.contains("'Query.other' is not resolvable by any source schema"));
}

#[test]
fn a_missing_query_root_fails_composition() {
    init_logger();
    let result = Planner::new_from_sdl(
        r#"
        schema @source__schema(name: "a", url: "http://a/graphql") {
          query: Query
        }

        type Product @source__type(schema: "a") {
          id: ID! @source__field(schema: "a")
        }
        "#,
    );

    let Err(PlannerError::Composition(error)) = result else {
        panic!("expected a composition error");
    };
    assert!(error
        .to_string()
        .contains("does not define a query root type"));
}

#[test]
fn duplicate_schema_declarations_are_rejected() {
    init_logger();
    let result = Planner::new_from_sdl(
        r#"
        schema
          @source__schema(name: "a", url: "http://a-1/graphql")
          @source__schema(name: "a", url: "http://a-2/graphql") {
          query: Query
        }

        type Query @source__type(schema: "a") {
          id: ID! @source__field(schema: "a")
        }
        "#,
    );

    let Err(PlannerError::Composition(error)) = result else {
        panic!("expected a composition error");
    };
    assert!(error
        .to_string()
        .contains("source schema 'a' is declared more than once"));
}
