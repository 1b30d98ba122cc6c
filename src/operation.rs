//! graphql operations
//!
//! queries and mutations wrap raw operation text. the root field of an
//! operation names the key under `data` that holds the caller's payload.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::fmt;

/// leading keyword, optional operation name, optional variable definitions
static OPERATION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:query|mutation|subscription)\b\s*(?:[_A-Za-z][_0-9A-Za-z]*)?\s*(?:\([^)]*\)\s*)?")
        .expect("Failed to compile operation header regex")
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z_][a-zA-Z0-9_]*").expect("Failed to compile identifier regex")
});

/// kind of graphql operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// a graphql query or mutation document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Query(String),
    Mutation(String),
}

impl Operation {
    /// wrap query text
    pub fn query(source: impl Into<String>) -> Self {
        Operation::Query(source.into())
    }

    /// wrap mutation text
    pub fn mutation(source: impl Into<String>) -> Self {
        Operation::Mutation(source.into())
    }

    /// raw operation text as sent on the wire
    pub fn source(&self) -> &str {
        match self {
            Operation::Query(source) | Operation::Mutation(source) => source,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Query(_) => OperationKind::Query,
            Operation::Mutation(_) => OperationKind::Mutation,
        }
    }

    /// name of the top-level selection, or an empty string if unresolved
    pub fn root_field(&self) -> String {
        root_field(self.source())
    }

    pub(crate) fn into_source(self) -> String {
        match self {
            Operation::Query(source) | Operation::Mutation(source) => source,
        }
    }
}

/// compute the root field name of an operation.
///
/// this is a pattern-based heuristic, not a graphql parser: the operation
/// header is stripped, the rest is split on the first two `{`, and the first
/// identifier between them is returned. aliased roots resolve to the alias and
/// top-level inline fragments do not resolve. returns an empty string when no
/// root can be found.
pub fn root_field(source: &str) -> String {
    let body = OPERATION_HEADER.replace(source, "");
    let parts: Vec<&str> = body.splitn(3, '{').collect();
    if parts.len() != 3 {
        return String::new();
    }

    IDENTIFIER
        .find(parts[1])
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// operation contract for types that carry a fixed document
pub trait TypedOperation {
    /// graphql query or mutation string
    const SOURCE: &'static str;
    /// whether the document is a query or a mutation
    const KIND: OperationKind;
    /// payload found under the root field
    type Response: DeserializeOwned;

    fn operation() -> Operation {
        match Self::KIND {
            OperationKind::Query => Operation::query(Self::SOURCE),
            OperationKind::Mutation => Operation::mutation(Self::SOURCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_named_query_with_variables() {
        let op = Operation::query("query GetUser($id: Int!) { user { id name } }");
        assert_eq!(op.root_field(), "user");
    }

    #[test]
    fn test_root_anonymous_mutation() {
        let op = Operation::mutation("mutation { createThing { id } }");
        assert_eq!(op.root_field(), "createThing");
    }

    #[test]
    fn test_root_shorthand_query() {
        assert_eq!(root_field("{ users { id } }"), "users");
    }

    #[test]
    fn test_root_with_arguments_on_root_field() {
        let source = "query GetUser($id: Int!) { user(id: $id) { name } }";
        assert_eq!(root_field(source), "user");
    }

    #[test]
    fn test_root_multiline() {
        let source = r#"
            query ListAccounts(
                $limit: Int
                $offset: Int
            ) {
                accounts(limit: $limit, offset: $offset) {
                    id
                    email
                }
            }
        "#;
        assert_eq!(root_field(source), "accounts");
    }

    #[test]
    fn test_root_field_containing_keyword() {
        let source = "query { queryUsers { id } }";
        assert_eq!(root_field(source), "queryUsers");
    }

    #[test]
    fn test_root_subscription() {
        assert_eq!(root_field("subscription OnEvent { events { id } }"), "events");
    }

    #[test]
    fn test_root_missing_second_brace() {
        assert_eq!(root_field("query { ok }"), "");
        assert_eq!(root_field("mutation Ping"), "");
        assert_eq!(root_field(""), "");
    }

    #[test]
    fn test_root_no_identifier() {
        assert_eq!(root_field("query { { id } }"), "");
    }

    #[test]
    fn test_root_alias_resolves_to_alias() {
        assert_eq!(root_field("query { me: user { id } }"), "me");
    }

    #[test]
    fn test_operation_accessors() {
        let op = Operation::mutation("mutation { a { b } }");
        assert_eq!(op.kind(), OperationKind::Mutation);
        assert_eq!(op.source(), "mutation { a { b } }");
        assert_eq!(op.kind().to_string(), "mutation");
        assert_eq!(op.into_source(), "mutation { a { b } }");
    }

    #[test]
    fn test_typed_operation() {
        struct ListUsers;
        impl TypedOperation for ListUsers {
            const SOURCE: &'static str = "query ListUsers { users { id } }";
            const KIND: OperationKind = OperationKind::Query;
            type Response = Vec<serde_json::Value>;
        }

        let op = ListUsers::operation();
        assert_eq!(op.kind(), OperationKind::Query);
        assert_eq!(op.root_field(), "users");
    }
}
