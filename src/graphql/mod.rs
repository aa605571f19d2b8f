//! GraphQL query parsing and hashing.
//!
//! These are the default collaborators of the document pipeline: a parser
//! turning query text into a [`Document`] and a content hash used as the
//! cache key. Both can be replaced through
//! [`DocumentPipeline`](crate::server::DocumentPipeline).

pub mod ast;
mod lexer;
mod parser;

pub use ast::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, Loc, Name, NamedType, ObjectField, OperationDefinition, OperationType,
    Selection, SelectionSet, TypeRef, Value, Variable, VariableDefinition,
};
pub use lexer::dedent_block_string;
pub use parser::MAX_NESTING_DEPTH;

use sha2::{Digest, Sha256};

use crate::DocstoreResult;

/// Parses an executable GraphQL document.
pub fn parse(source: &str) -> DocstoreResult<Document> {
    parser::Parser::new(source).parse_document()
}

/// Content hash of a query: lowercase hex SHA-256 of its text.
pub fn query_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}
