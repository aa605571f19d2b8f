//! GraphQL executable document AST.
//!
//! Nodes serialize to the same JSON shape as graphql-js documents:
//! a leading `kind` tag, fields in a fixed order, a `loc` span on every
//! node, and absent optional children left out entirely.

use serde::{Deserialize, Serialize};

/// Byte span of a node in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loc {
    pub start: usize,
    pub end: usize,
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Root of a parsed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "Document")]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub loc: Loc,
}

impl Document {
    /// Operation definitions in document order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::OperationDefinition(operation) => Some(operation),
            Definition::FragmentDefinition(_) => None,
        })
    }

    /// Fragment definitions in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::FragmentDefinition(fragment) => Some(fragment),
            Definition::OperationDefinition(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Definition {
    OperationDefinition(OperationDefinition),
    FragmentDefinition(FragmentDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Query => write!(f, "query"),
            OperationType::Mutation => write!(f, "mutation"),
            OperationType::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDefinition {
    pub operation: OperationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    pub variable_definitions: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: NamedType,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "VariableDefinition", rename_all = "camelCase")]
pub struct VariableDefinition {
    pub variable: Variable,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "Variable")]
pub struct Variable {
    pub name: Name,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "SelectionSet")]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_set: Option<SelectionSet>,
    pub loc: Loc,
}

impl Field {
    /// Key under which this field appears in a response.
    pub fn response_key(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).value.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpread {
    pub name: Name,
    pub directives: Vec<Directive>,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<NamedType>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "Argument")]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "Directive")]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "Name")]
pub struct Name {
    pub value: String,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "NamedType")]
pub struct NamedType {
    pub name: Name,
    pub loc: Loc,
}

/// Type reference in a variable definition.
///
/// The named case is spelled out instead of wrapping [`NamedType`], which
/// carries its own tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeRef {
    NamedType {
        name: Name,
        loc: Loc,
    },
    ListType {
        #[serde(rename = "type")]
        ty: Box<TypeRef>,
        loc: Loc,
    },
    NonNullType {
        #[serde(rename = "type")]
        ty: Box<TypeRef>,
        loc: Loc,
    },
}

/// Input value literal.
///
/// Numeric literals keep their source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Value {
    Variable { name: Name, loc: Loc },
    IntValue { value: String, loc: Loc },
    FloatValue { value: String, loc: Loc },
    StringValue { value: String, block: bool, loc: Loc },
    BooleanValue { value: bool, loc: Loc },
    NullValue { loc: Loc },
    EnumValue { value: String, loc: Loc },
    ListValue { values: Vec<Value>, loc: Loc },
    ObjectValue { fields: Vec<ObjectField>, loc: Loc },
}

impl Value {
    pub fn loc(&self) -> Loc {
        match self {
            Value::Variable { loc, .. }
            | Value::IntValue { loc, .. }
            | Value::FloatValue { loc, .. }
            | Value::StringValue { loc, .. }
            | Value::BooleanValue { loc, .. }
            | Value::NullValue { loc }
            | Value::EnumValue { loc, .. }
            | Value::ListValue { loc, .. }
            | Value::ObjectValue { loc, .. } => *loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "ObjectField")]
pub struct ObjectField {
    pub name: Name,
    pub value: Value,
    pub loc: Loc,
}
