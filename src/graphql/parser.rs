//! Recursive descent parser for GraphQL executable documents.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::{DocstoreError, DocstoreResult};

/// Deepest combined nesting of selection sets, list and object values, and
/// list types.
///
/// Every document within this limit serializes to JSON nested less than 128
/// levels deep, so it can be read back by `serde_json` from a store.
pub const MAX_NESTING_DEPTH: usize = 32;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    /// End of the most recently consumed token.
    last_end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            token: Token {
                kind: TokenKind::Sof,
                start: 0,
                end: 0,
                value: String::new(),
            },
            last_end: 0,
            depth: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Token helpers
    // ═══════════════════════════════════════════════════════════════════════

    fn advance(&mut self) -> DocstoreResult<Token> {
        let next = self.lexer.next_token()?;
        let previous = std::mem::replace(&mut self.token, next);
        self.last_end = previous.end;
        Ok(previous)
    }

    fn loc(&self, start: usize) -> Loc {
        Loc::new(start, self.last_end)
    }

    fn peek(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.token.kind == TokenKind::Name && self.token.value == keyword
    }

    fn expect(&mut self, kind: TokenKind) -> DocstoreResult<Token> {
        if self.peek(kind) {
            return self.advance();
        }
        Err(DocstoreError::syntax(
            format!("Expected {}, found {}", kind, self.token.describe()),
            self.token.start,
        ))
    }

    fn expect_optional(&mut self, kind: TokenKind) -> DocstoreResult<bool> {
        if self.peek(kind) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_keyword(&mut self, keyword: &str) -> DocstoreResult<()> {
        if self.peek_keyword(keyword) {
            self.advance()?;
            return Ok(());
        }
        Err(DocstoreError::syntax(
            format!("Expected \"{}\", found {}", keyword, self.token.describe()),
            self.token.start,
        ))
    }

    fn expect_optional_keyword(&mut self, keyword: &str) -> DocstoreResult<bool> {
        if self.peek_keyword(keyword) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn unexpected(&self) -> DocstoreError {
        DocstoreError::syntax(
            format!("Unexpected {}", self.token.describe()),
            self.token.start,
        )
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> DocstoreResult<T>,
    ) -> DocstoreResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(DocstoreError::syntax(
                "Document nesting too deep",
                self.token.start,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Zero or more items between `open` and `close`.
    fn any<T>(
        &mut self,
        open: TokenKind,
        mut item: impl FnMut(&mut Self) -> DocstoreResult<T>,
        close: TokenKind,
    ) -> DocstoreResult<Vec<T>> {
        self.expect(open)?;
        let mut items = Vec::new();
        while !self.expect_optional(close)? {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// One or more items between `open` and `close`.
    fn many<T>(
        &mut self,
        open: TokenKind,
        mut item: impl FnMut(&mut Self) -> DocstoreResult<T>,
        close: TokenKind,
    ) -> DocstoreResult<Vec<T>> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            items.push(item(self)?);
            if self.expect_optional(close)? {
                return Ok(items);
            }
        }
    }

    /// Like [`Parser::many`], but yields nothing when `open` is absent.
    fn optional_many<T>(
        &mut self,
        open: TokenKind,
        item: impl FnMut(&mut Self) -> DocstoreResult<T>,
        close: TokenKind,
    ) -> DocstoreResult<Vec<T>> {
        if self.peek(open) {
            self.many(open, item, close)
        } else {
            Ok(Vec::new())
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Definitions
    // ═══════════════════════════════════════════════════════════════════════

    pub fn parse_document(&mut self) -> DocstoreResult<Document> {
        let start = self.token.start;
        let definitions = self.many(TokenKind::Sof, Self::parse_definition, TokenKind::Eof)?;
        Ok(Document {
            definitions,
            loc: self.loc(start),
        })
    }

    fn parse_definition(&mut self) -> DocstoreResult<Definition> {
        if self.peek(TokenKind::BraceL) {
            return Ok(Definition::OperationDefinition(
                self.parse_operation_definition()?,
            ));
        }
        if self.peek(TokenKind::Name) {
            match self.token.value.as_str() {
                "query" | "mutation" | "subscription" => {
                    return Ok(Definition::OperationDefinition(
                        self.parse_operation_definition()?,
                    ));
                }
                "fragment" => {
                    return Ok(Definition::FragmentDefinition(
                        self.parse_fragment_definition()?,
                    ));
                }
                _ => {}
            }
        }
        Err(self.unexpected())
    }

    fn parse_operation_definition(&mut self) -> DocstoreResult<OperationDefinition> {
        let start = self.token.start;

        if self.peek(TokenKind::BraceL) {
            let selection_set = self.parse_selection_set()?;
            return Ok(OperationDefinition {
                operation: OperationType::Query,
                name: None,
                variable_definitions: Vec::new(),
                directives: Vec::new(),
                selection_set,
                loc: self.loc(start),
            });
        }

        let operation = self.parse_operation_type()?;
        let name = if self.peek(TokenKind::Name) {
            Some(self.parse_name()?)
        } else {
            None
        };
        let variable_definitions = self.optional_many(
            TokenKind::ParenL,
            Self::parse_variable_definition,
            TokenKind::ParenR,
        )?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(OperationDefinition {
            operation,
            name,
            variable_definitions,
            directives,
            selection_set,
            loc: self.loc(start),
        })
    }

    fn parse_operation_type(&mut self) -> DocstoreResult<OperationType> {
        let token = self.expect(TokenKind::Name)?;
        match token.value.as_str() {
            "query" => Ok(OperationType::Query),
            "mutation" => Ok(OperationType::Mutation),
            "subscription" => Ok(OperationType::Subscription),
            _ => Err(DocstoreError::syntax(
                format!("Unexpected {}", token.describe()),
                token.start,
            )),
        }
    }

    fn parse_variable_definition(&mut self) -> DocstoreResult<VariableDefinition> {
        let start = self.token.start;
        let variable = self.parse_variable()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type_reference()?;
        let default_value = if self.expect_optional(TokenKind::Equals)? {
            Some(self.parse_value_literal(true)?)
        } else {
            None
        };
        let directives = self.parse_directives(true)?;

        Ok(VariableDefinition {
            variable,
            ty,
            default_value,
            directives,
            loc: self.loc(start),
        })
    }

    fn parse_variable(&mut self) -> DocstoreResult<Variable> {
        let start = self.token.start;
        self.expect(TokenKind::Dollar)?;
        let name = self.parse_name()?;
        Ok(Variable {
            name,
            loc: self.loc(start),
        })
    }

    fn parse_fragment_definition(&mut self) -> DocstoreResult<FragmentDefinition> {
        let start = self.token.start;
        self.expect_keyword("fragment")?;
        let name = self.parse_fragment_name()?;
        self.expect_keyword("on")?;
        let type_condition = self.parse_named_type()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            loc: self.loc(start),
        })
    }

    fn parse_fragment_name(&mut self) -> DocstoreResult<Name> {
        if self.peek_keyword("on") {
            return Err(self.unexpected());
        }
        self.parse_name()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Selections
    // ═══════════════════════════════════════════════════════════════════════

    fn parse_selection_set(&mut self) -> DocstoreResult<SelectionSet> {
        let start = self.token.start;
        let selections = self.nested(|parser| {
            parser.many(TokenKind::BraceL, Self::parse_selection, TokenKind::BraceR)
        })?;
        Ok(SelectionSet {
            selections,
            loc: self.loc(start),
        })
    }

    fn parse_selection(&mut self) -> DocstoreResult<Selection> {
        if self.peek(TokenKind::Spread) {
            self.parse_fragment()
        } else {
            Ok(Selection::Field(self.parse_field()?))
        }
    }

    fn parse_field(&mut self) -> DocstoreResult<Field> {
        let start = self.token.start;
        let name_or_alias = self.parse_name()?;
        let (alias, name) = if self.expect_optional(TokenKind::Colon)? {
            (Some(name_or_alias), self.parse_name()?)
        } else {
            (None, name_or_alias)
        };
        let arguments = self.parse_arguments(false)?;
        let directives = self.parse_directives(false)?;
        let selection_set = if self.peek(TokenKind::BraceL) {
            Some(self.parse_selection_set()?)
        } else {
            None
        };

        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            loc: self.loc(start),
        })
    }

    fn parse_fragment(&mut self) -> DocstoreResult<Selection> {
        let start = self.token.start;
        self.expect(TokenKind::Spread)?;

        let has_type_condition = self.expect_optional_keyword("on")?;
        if !has_type_condition && self.peek(TokenKind::Name) {
            let name = self.parse_fragment_name()?;
            let directives = self.parse_directives(false)?;
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                loc: self.loc(start),
            }));
        }

        let type_condition = if has_type_condition {
            Some(self.parse_named_type()?)
        } else {
            None
        };
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selection_set,
            loc: self.loc(start),
        }))
    }

    fn parse_arguments(&mut self, is_const: bool) -> DocstoreResult<Vec<Argument>> {
        self.optional_many(
            TokenKind::ParenL,
            |parser| parser.parse_argument(is_const),
            TokenKind::ParenR,
        )
    }

    fn parse_argument(&mut self, is_const: bool) -> DocstoreResult<Argument> {
        let start = self.token.start;
        let name = self.parse_name()?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_value_literal(is_const)?;
        Ok(Argument {
            name,
            value,
            loc: self.loc(start),
        })
    }

    fn parse_directives(&mut self, is_const: bool) -> DocstoreResult<Vec<Directive>> {
        let mut directives = Vec::new();
        while self.peek(TokenKind::At) {
            let start = self.token.start;
            self.advance()?;
            let name = self.parse_name()?;
            let arguments = self.parse_arguments(is_const)?;
            directives.push(Directive {
                name,
                arguments,
                loc: self.loc(start),
            });
        }
        Ok(directives)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Values and types
    // ═══════════════════════════════════════════════════════════════════════

    fn parse_value_literal(&mut self, is_const: bool) -> DocstoreResult<Value> {
        let start = self.token.start;
        match self.token.kind {
            TokenKind::BracketL => {
                let values = self.nested(|parser| {
                    parser.any(
                        TokenKind::BracketL,
                        |parser| parser.parse_value_literal(is_const),
                        TokenKind::BracketR,
                    )
                })?;
                Ok(Value::ListValue {
                    values,
                    loc: self.loc(start),
                })
            }
            TokenKind::BraceL => {
                let fields = self.nested(|parser| {
                    parser.any(
                        TokenKind::BraceL,
                        |parser| parser.parse_object_field(is_const),
                        TokenKind::BraceR,
                    )
                })?;
                Ok(Value::ObjectValue {
                    fields,
                    loc: self.loc(start),
                })
            }
            TokenKind::Int => {
                let token = self.advance()?;
                Ok(Value::IntValue {
                    value: token.value,
                    loc: self.loc(start),
                })
            }
            TokenKind::Float => {
                let token = self.advance()?;
                Ok(Value::FloatValue {
                    value: token.value,
                    loc: self.loc(start),
                })
            }
            TokenKind::String | TokenKind::BlockString => {
                let token = self.advance()?;
                Ok(Value::StringValue {
                    value: token.value,
                    block: token.kind == TokenKind::BlockString,
                    loc: self.loc(start),
                })
            }
            TokenKind::Name => {
                let token = self.advance()?;
                let loc = self.loc(start);
                Ok(if token.value == "true" {
                    Value::BooleanValue { value: true, loc }
                } else if token.value == "false" {
                    Value::BooleanValue { value: false, loc }
                } else if token.value == "null" {
                    Value::NullValue { loc }
                } else {
                    Value::EnumValue {
                        value: token.value,
                        loc,
                    }
                })
            }
            TokenKind::Dollar if !is_const => {
                let variable = self.parse_variable()?;
                Ok(Value::Variable {
                    name: variable.name,
                    loc: variable.loc,
                })
            }
            TokenKind::Dollar => Err(DocstoreError::syntax(
                "Unexpected variable in constant value",
                start,
            )),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_object_field(&mut self, is_const: bool) -> DocstoreResult<ObjectField> {
        let start = self.token.start;
        let name = self.parse_name()?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_value_literal(is_const)?;
        Ok(ObjectField {
            name,
            value,
            loc: self.loc(start),
        })
    }

    fn parse_type_reference(&mut self) -> DocstoreResult<TypeRef> {
        let start = self.token.start;
        let ty = if self.peek(TokenKind::BracketL) {
            let inner = self.nested(|parser| {
                parser.advance()?;
                let inner = parser.parse_type_reference()?;
                parser.expect(TokenKind::BracketR)?;
                Ok(inner)
            })?;
            TypeRef::ListType {
                ty: Box::new(inner),
                loc: self.loc(start),
            }
        } else {
            let named = self.parse_named_type()?;
            TypeRef::NamedType {
                name: named.name,
                loc: named.loc,
            }
        };

        if self.expect_optional(TokenKind::Bang)? {
            return Ok(TypeRef::NonNullType {
                ty: Box::new(ty),
                loc: self.loc(start),
            });
        }
        Ok(ty)
    }

    fn parse_named_type(&mut self) -> DocstoreResult<NamedType> {
        let start = self.token.start;
        let name = self.parse_name()?;
        Ok(NamedType {
            name,
            loc: self.loc(start),
        })
    }

    fn parse_name(&mut self) -> DocstoreResult<Name> {
        let token = self.expect(TokenKind::Name)?;
        Ok(Name {
            value: token.value,
            loc: self.loc(token.start),
        })
    }
}
