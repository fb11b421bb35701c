//! Recursive descent parser for ActionScript compilation units.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::types::{StaticType, TypeAnnotation};
use crate::{ParseOptions, ParseResult};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use source_map::{LineIndex, SourceLocation, Span};
use text_size::TextSize;

/// Words that act as class member or declaration modifiers.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "override", "final", "dynamic",
    "native", "virtual",
];

/// The ActionScript parser.
pub struct Parser<'src> {
    source: &'src str,
    path: SmolStr,
    index: LineIndex,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    next_id: u32,
    /// End of the most recently consumed token.
    prev_end: TextSize,
    /// Package enclosing the declarations being parsed.
    package: SmolStr,
    eof_token: Token,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, options: &ParseOptions) -> Self {
        let mut errors = Vec::new();
        let mut tokens = Vec::new();
        for token in Lexer::new(source) {
            if token.kind == TokenKind::Error {
                let text = token.span.slice(source).unwrap_or_default();
                let kind = if text.starts_with('"') || text.starts_with('\'') {
                    ParseErrorKind::UnterminatedString
                } else {
                    ParseErrorKind::InvalidToken {
                        text: text.to_string(),
                    }
                };
                errors.push(ParseError::new(kind, token.span));
                continue;
            }
            tokens.push(token);
        }
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            path: options.path.clone(),
            index: LineIndex::new(source),
            tokens,
            pos: 0,
            errors,
            next_id: 0,
            prev_end: TextSize::from(0),
            package: SmolStr::default(),
            eof_token,
        }
    }

    /// Parses the whole source into an unresolved compilation unit.
    pub fn parse(mut self) -> ParseResult {
        let start = self.current().span.start;
        let mut package = None;
        let mut body = Vec::new();

        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::Package) {
                let (decl, stmts) = self.parse_package();
                if package.is_none() {
                    package = Some(decl);
                }
                body.extend(stmts);
            } else {
                let before = self.pos;
                body.push(self.parse_statement());
                self.ensure_progress(before);
            }
        }

        let unit = CompilationUnit {
            path: self.path.clone(),
            package,
            body,
            constants: FxHashMap::default(),
            loc: self.loc(Span::new(start, TextSize::from(self.source.len() as u32))),
        };
        ParseResult {
            unit,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn current_text(&self) -> &'src str {
        self.current().span.slice(self.source).unwrap_or_default()
    }

    fn peek_text(&self, n: usize) -> &'src str {
        self.tokens
            .get(self.pos + n)
            .and_then(|t| t.span.slice(self.source))
            .unwrap_or_default()
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.prev_end = self.tokens[self.pos].span.end;
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// True when the current token is an identifier spelled `word`.
    fn check_word(&self, word: &str) -> bool {
        self.check(TokenKind::Ident) && self.current_text() == word
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` and returns its span, or reports an error.
    fn expect(&mut self, kind: TokenKind) -> Option<Span> {
        if self.check(kind) {
            let span = self.current().span;
            self.advance();
            Some(span)
        } else {
            self.error_expected(kind.name());
            None
        }
    }

    fn error_expected(&mut self, expected: &str) {
        let kind = if self.check(TokenKind::Eof) {
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_kind().name().to_string(),
            }
        };
        self.error(kind);
    }

    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    /// Skips a token when a statement-level parse consumed nothing.
    fn ensure_progress(&mut self, before: usize) {
        if self.pos == before && !self.check(TokenKind::Eof) {
            self.advance();
        }
    }

    fn newline_before_current(&self) -> bool {
        let from = usize::from(self.prev_end);
        let to = usize::from(self.current().span.start);
        self.source
            .get(from..to)
            .map_or(false, |gap| gap.contains('\n'))
    }

    /// Consumes a statement terminator, allowing it to be omitted at a line
    /// break, before `}` or at the end of input.
    fn consume_semicolon(&mut self) {
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        if self.check(TokenKind::RBrace) || self.check(TokenKind::Eof) || self.newline_before_current()
        {
            return;
        }
        self.error_expected("';'");
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn loc(&self, span: Span) -> SourceLocation {
        SourceLocation::from_span(&self.path, span, self.source, &self.index)
    }

    /// Location from `start` through the end of the last consumed token.
    fn loc_from(&self, start: TextSize) -> SourceLocation {
        self.loc(Span::new(start, self.prev_end.max(start)))
    }

    fn start(&self) -> TextSize {
        self.current().span.start
    }

    fn expr(&mut self, kind: ExprKind, start: TextSize) -> Expr {
        Expr {
            id: self.next_id(),
            kind,
            loc: self.loc_from(start),
        }
    }

    fn stmt(&mut self, kind: StmtKind, start: TextSize) -> Stmt {
        Stmt {
            id: self.next_id(),
            kind,
            loc: self.loc_from(start),
        }
    }

    // === Declarations ===

    fn parse_package(&mut self) -> (PackageDecl, Vec<Stmt>) {
        let start = self.start();
        self.advance();
        let name = if self.check(TokenKind::Ident) {
            self.parse_dotted_name()
        } else {
            SmolStr::default()
        };
        self.package = name.clone();

        let mut body = Vec::new();
        if self.expect(TokenKind::LBrace).is_some() {
            while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
                let before = self.pos;
                body.push(self.parse_statement());
                self.ensure_progress(before);
            }
            self.expect(TokenKind::RBrace);
        }
        let decl = PackageDecl {
            name,
            loc: self.loc_from(start),
        };
        self.package = SmolStr::default();
        (decl, body)
    }

    fn parse_dotted_name(&mut self) -> SmolStr {
        let mut name = String::from(self.current_text());
        self.advance();
        while self.check(TokenKind::Dot) {
            match self.peek_kind(1) {
                TokenKind::Ident | TokenKind::Star => {}
                kind if kind.is_keyword() => {}
                _ => break,
            }
            self.advance();
            name.push('.');
            name.push_str(self.current_text());
            self.advance();
        }
        SmolStr::new(name)
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        while self.check(TokenKind::Ident) && MODIFIERS.contains(&self.current_text()) {
            match self.current_text() {
                "public" => modifiers.visibility = Visibility::Public,
                "private" => modifiers.visibility = Visibility::Private,
                "protected" => modifiers.visibility = Visibility::Protected,
                "internal" => modifiers.visibility = Visibility::Internal,
                "static" => modifiers.is_static = true,
                "override" => modifiers.is_override = true,
                "final" => modifiers.is_final = true,
                "dynamic" => modifiers.is_dynamic = true,
                _ => {}
            }
            self.advance();
        }
        modifiers
    }

    /// Skips `[Metadata(...)]` annotations.
    fn skip_metadata(&mut self) {
        while self.check(TokenKind::LBracket) {
            let mut depth = 0usize;
            loop {
                match self.current_kind() {
                    TokenKind::LBracket => depth += 1,
                    TokenKind::RBracket => depth = depth.saturating_sub(1),
                    TokenKind::Eof => return,
                    _ => {}
                }
                self.advance();
                if depth == 0 {
                    break;
                }
            }
        }
    }

    fn parse_class(&mut self, start: TextSize, modifiers: Modifiers) -> ClassDecl {
        self.expect(TokenKind::Class);
        let name = self.parse_identifier();
        let qualified_name = if self.package.is_empty() {
            name.name.clone()
        } else {
            SmolStr::new(format!("{}.{}", self.package, name.name))
        };

        let extends = if self.eat(TokenKind::Extends) {
            Some(self.parse_type_reference())
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat(TokenKind::Implements) {
            loop {
                implements.push(self.parse_type_reference());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let mut members: Vec<ClassMember> = Vec::new();
        if self.expect(TokenKind::LBrace).is_some() {
            while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
                let before = self.pos;
                self.parse_member(&name.name, &mut members);
                self.ensure_progress(before);
            }
            self.expect(TokenKind::RBrace);
        }

        ClassDecl {
            name,
            qualified_name,
            modifiers,
            extends,
            implements,
            members,
            loc: self.loc_from(start),
        }
    }

    /// A dotted type name used after `extends`/`implements`.
    fn parse_type_reference(&mut self) -> Identifier {
        let start = self.start();
        if !self.check(TokenKind::Ident) {
            self.error_expected("type name");
            return Identifier {
                name: SmolStr::default(),
                loc: self.loc(Span::empty(start)),
                binding: Binding::Unresolved,
            };
        }
        let name = self.parse_dotted_name();
        Identifier {
            name,
            loc: self.loc_from(start),
            binding: Binding::Unresolved,
        }
    }

    fn parse_member(&mut self, class_name: &str, members: &mut Vec<ClassMember>) {
        self.skip_metadata();
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        let start = self.start();
        let modifiers = self.parse_modifiers();

        match self.current_kind() {
            TokenKind::Var | TokenKind::Const => {
                let decl = self.parse_var_decl(false);
                for (i, declarator) in decl.declarators.into_iter().enumerate() {
                    let loc = if i == 0 {
                        self.loc(Span::new(start, TextSize::from(declarator.loc.end as u32)))
                    } else {
                        declarator.loc.clone()
                    };
                    self.push_member(
                        members,
                        ClassMember {
                            id: declarator.id,
                            modifiers,
                            kind: MemberKind::Field(Field {
                                kind: decl.kind,
                                name: declarator.name,
                                ty: declarator.ty,
                                init: declarator.init,
                            }),
                            loc,
                        },
                    );
                }
                self.consume_semicolon();
            }
            TokenKind::Function => {
                self.advance();
                let accessor = if (self.check_word("get") || self.check_word("set"))
                    && (self.peek_kind(1) == TokenKind::Ident || self.peek_kind(1).is_keyword())
                {
                    let word = self.current_text();
                    self.advance();
                    Some(word)
                } else {
                    None
                };
                let function = self.parse_function_rest(start, true);
                let is_constructor = accessor.is_none()
                    && function
                        .name
                        .as_ref()
                        .map_or(false, |n| n.name == class_name);
                let kind = match accessor {
                    Some("get") => MemberKind::Getter(function),
                    Some(_) => MemberKind::Setter(function),
                    None if is_constructor => MemberKind::Constructor(function),
                    None => MemberKind::Method(function),
                };
                let id = self.next_id();
                let loc = self.loc_from(start);
                self.push_member(
                    members,
                    ClassMember {
                        id,
                        modifiers,
                        kind,
                        loc,
                    },
                );
                self.eat(TokenKind::Semicolon);
            }
            _ => {
                self.error_expected("class member");
                self.advance();
            }
        }
    }

    fn push_member(&mut self, members: &mut Vec<ClassMember>, member: ClassMember) {
        let name = member_name(&member.kind);
        let is_accessor = matches!(member.kind, MemberKind::Getter(_) | MemberKind::Setter(_));
        let duplicate = !is_accessor
            && members.iter().any(|m| {
                m.modifiers.is_static == member.modifiers.is_static
                    && !matches!(m.kind, MemberKind::Getter(_) | MemberKind::Setter(_))
                    && member_name(&m.kind) == name
            });
        if duplicate {
            self.errors.push(ParseError::new(
                ParseErrorKind::DuplicateMember {
                    name: name.to_string(),
                },
                Span::new(member.loc.start as u32, member.loc.end as u32),
            ));
        }
        members.push(member);
    }

    /// Parses a function after the `function` keyword (and accessor word).
    fn parse_function_rest(&mut self, start: TextSize, require_name: bool) -> Function {
        let name = if self.check(TokenKind::Ident) || (require_name && self.current_kind().is_keyword())
        {
            Some(self.parse_identifier_or_keyword())
        } else {
            if require_name {
                self.error_expected("function name");
            }
            None
        };

        let params_start = self.start();
        let mut params = Vec::new();
        if self.expect(TokenKind::LParen).is_some() {
            while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                params.push(self.parse_param());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen);
        }
        let params_loc = self.loc_from(params_start);
        let return_type = self.parse_type_annotation();
        let body = self.parse_block();

        Function {
            name,
            params,
            params_loc,
            return_type,
            body,
            loc: self.loc_from(start),
        }
    }

    fn parse_param(&mut self) -> Param {
        let start = self.start();
        let rest = self.eat(TokenKind::Ellipsis);
        let name = self.parse_identifier();
        let ty = self.parse_type_annotation();
        let default = if self.eat(TokenKind::Eq) {
            Some(self.parse_assignment(false))
        } else {
            None
        };
        Param {
            name,
            ty,
            default,
            rest,
            loc: self.loc_from(start),
        }
    }

    /// Parses an optional `:Type` clause.
    fn parse_type_annotation(&mut self) -> Option<TypeAnnotation> {
        if !self.check(TokenKind::Colon) {
            return None;
        }
        let start = self.start();
        self.advance();
        let name_start = self.start();
        match self.current_kind() {
            TokenKind::Star | TokenKind::Void => self.advance(),
            TokenKind::Ident => {
                self.parse_dotted_name();
                // Vector.<T>
                if self.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Lt {
                    self.advance();
                    self.advance();
                    self.parse_type_name_only();
                    self.expect(TokenKind::Gt);
                }
            }
            _ => {
                self.error_expected("type name");
                return None;
            }
        }
        let name_span = Span::new(name_start, self.prev_end);
        let name = SmolStr::new(name_span.slice(self.source).unwrap_or_default());
        Some(TypeAnnotation {
            ty: StaticType::from_name(&name),
            name,
            loc: self.loc_from(start),
        })
    }

    fn parse_type_name_only(&mut self) {
        match self.current_kind() {
            TokenKind::Star => self.advance(),
            TokenKind::Ident => {
                self.parse_dotted_name();
            }
            _ => self.error_expected("type name"),
        }
    }

    fn parse_var_decl(&mut self, no_in: bool) -> VarDecl {
        let start = self.start();
        let kind = if self.eat(TokenKind::Const) {
            VarKind::Const
        } else {
            self.expect(TokenKind::Var);
            VarKind::Var
        };
        let mut declarators = Vec::new();
        loop {
            let decl_start = self.start();
            let name = self.parse_identifier();
            let ty = self.parse_type_annotation();
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment(no_in))
            } else {
                None
            };
            declarators.push(Declarator {
                id: self.next_id(),
                name,
                ty,
                init,
                loc: self.loc_from(decl_start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        VarDecl {
            kind,
            declarators,
            loc: self.loc_from(start),
        }
    }

    // === Statements ===

    fn parse_block(&mut self) -> Block {
        let start = self.start();
        let mut stmts = Vec::new();
        if self.expect(TokenKind::LBrace).is_some() {
            while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
                let before = self.pos;
                stmts.push(self.parse_statement());
                self.ensure_progress(before);
            }
            self.expect(TokenKind::RBrace);
        }
        Block {
            stmts,
            loc: self.loc_from(start),
        }
    }

    pub(crate) fn parse_statement(&mut self) -> Stmt {
        let start = self.start();
        match self.current_kind() {
            TokenKind::LBrace => {
                let block = self.parse_block();
                self.stmt(StmtKind::Block(block), start)
            }
            TokenKind::Semicolon => {
                self.advance();
                self.stmt(StmtKind::Empty, start)
            }
            TokenKind::Var | TokenKind::Const => {
                let decl = self.parse_var_decl(false);
                let stmt = self.stmt(StmtKind::Var(decl), start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_paren_condition();
                let body = self.parse_statement();
                self.stmt(
                    StmtKind::While {
                        condition,
                        body: Box::new(body),
                    },
                    start,
                )
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_statement();
                let while_keyword = self.loc(self.current().span);
                self.expect(TokenKind::While);
                let condition = self.parse_paren_condition();
                let stmt = self.stmt(
                    StmtKind::DoWhile {
                        body: Box::new(body),
                        while_keyword,
                        condition,
                    },
                    start,
                );
                self.eat(TokenKind::Semicolon);
                stmt
            }
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression(false))
                };
                let stmt = self.stmt(StmtKind::Return(value), start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::Throw => {
                self.advance();
                let value = if self.at_statement_end() {
                    self.error_expected("expression");
                    None
                } else {
                    Some(self.parse_expression(false))
                };
                let stmt = self.stmt(StmtKind::Throw(value), start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.check(TokenKind::Break);
                self.advance();
                let label = if self.check(TokenKind::Ident) && !self.newline_before_current() {
                    Some(self.parse_identifier())
                } else {
                    None
                };
                let kind = if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                };
                let stmt = self.stmt(kind, start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::With => {
                self.advance();
                let object = self.parse_paren_condition();
                let body = self.parse_statement();
                self.stmt(
                    StmtKind::With {
                        object,
                        body: Box::new(body),
                    },
                    start,
                )
            }
            TokenKind::Import => {
                self.advance();
                let name = if self.check(TokenKind::Ident) {
                    self.parse_dotted_name()
                } else {
                    self.error_expected("import name");
                    SmolStr::default()
                };
                let loc = self.loc_from(start);
                let stmt = self.stmt(StmtKind::Import(ImportDecl { name, loc }), start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::Function if self.peek_kind(1) == TokenKind::Ident => {
                self.advance();
                let function = self.parse_function_rest(start, true);
                self.stmt(StmtKind::Function(Box::new(function)), start)
            }
            TokenKind::Class => {
                let class = self.parse_class(start, Modifiers::default());
                self.stmt(StmtKind::Class(Box::new(class)), start)
            }
            TokenKind::Interface => {
                self.error(ParseErrorKind::SyntaxError {
                    message: "interface declarations are not supported".to_string(),
                });
                self.skip_declaration();
                self.stmt(StmtKind::Empty, start)
            }
            TokenKind::LBracket if self.at_metadata() => {
                self.skip_metadata();
                self.parse_statement()
            }
            TokenKind::Ident if self.current_text() == "use" && self.peek_text(1) == "namespace" => {
                self.advance();
                self.advance();
                let name = self.parse_identifier();
                let stmt = self.stmt(StmtKind::UseNamespace(name), start);
                self.consume_semicolon();
                stmt
            }
            TokenKind::Ident if MODIFIERS.contains(&self.current_text()) && self.at_modified_declaration() => {
                let modifiers = self.parse_modifiers();
                match self.current_kind() {
                    TokenKind::Class => {
                        let class = self.parse_class(start, modifiers);
                        self.stmt(StmtKind::Class(Box::new(class)), start)
                    }
                    TokenKind::Function => {
                        self.advance();
                        let function = self.parse_function_rest(start, true);
                        self.stmt(StmtKind::Function(Box::new(function)), start)
                    }
                    TokenKind::Interface => {
                        self.error(ParseErrorKind::SyntaxError {
                            message: "interface declarations are not supported".to_string(),
                        });
                        self.skip_declaration();
                        self.stmt(StmtKind::Empty, start)
                    }
                    _ => {
                        let decl = self.parse_var_decl(false);
                        let stmt = self.stmt(StmtKind::Var(decl), start);
                        self.consume_semicolon();
                        stmt
                    }
                }
            }
            TokenKind::Ident if self.peek_kind(1) == TokenKind::Colon => {
                let label = self.parse_identifier();
                self.advance();
                let body = self.parse_statement();
                self.stmt(
                    StmtKind::Labeled {
                        label,
                        body: Box::new(body),
                    },
                    start,
                )
            }
            _ => {
                let expr = self.parse_expression(false);
                let stmt = self.stmt(StmtKind::Expr(expr), start);
                self.consume_semicolon();
                stmt
            }
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) || self.newline_before_current()
    }

    /// `[Name` or `[Name(` at statement level starts metadata, not an array.
    fn at_metadata(&self) -> bool {
        self.peek_kind(1) == TokenKind::Ident
            && matches!(self.peek_kind(2), TokenKind::LParen | TokenKind::RBracket)
    }

    fn at_modified_declaration(&self) -> bool {
        let mut n = 0;
        while self.peek_kind(n) == TokenKind::Ident && MODIFIERS.contains(&self.peek_text(n)) {
            n += 1;
        }
        matches!(
            self.peek_kind(n),
            TokenKind::Class
                | TokenKind::Function
                | TokenKind::Interface
                | TokenKind::Var
                | TokenKind::Const
        )
    }

    /// Skips a declaration header and its braced body.
    fn skip_declaration(&mut self) {
        while !self.check(TokenKind::LBrace) && !self.check(TokenKind::Eof) {
            self.advance();
        }
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::Eof => return,
                _ => {}
            }
            self.advance();
            if depth == 0 {
                break;
            }
        }
    }

    fn parse_paren_condition(&mut self) -> Expr {
        self.expect(TokenKind::LParen);
        let expr = self.parse_expression(false);
        self.expect(TokenKind::RParen);
        expr
    }

    fn parse_if(&mut self) -> Stmt {
        let start = self.start();
        self.advance();
        let condition = self.parse_paren_condition();
        let then_branch = self.parse_statement();
        let else_branch = if self.check(TokenKind::Else) {
            let keyword = self.loc(self.current().span);
            self.advance();
            let body = self.parse_statement();
            Some(ElseClause {
                keyword,
                body: Box::new(body),
            })
        } else {
            None
        };
        self.stmt(
            StmtKind::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch,
            },
            start,
        )
    }

    fn parse_for(&mut self) -> Stmt {
        let start = self.start();
        self.advance();
        let each = if self.check_word("each") {
            self.advance();
            true
        } else {
            false
        };
        self.expect(TokenKind::LParen);

        let init = match self.current_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => Some(ForInit::Var(self.parse_var_decl(true))),
            _ => Some(ForInit::Expr(self.parse_expression(true))),
        };

        if self.check(TokenKind::In) {
            self.advance();
            let binding = match init {
                Some(ForInit::Var(decl)) => {
                    if decl.declarators.len() != 1 {
                        self.error(ParseErrorKind::SyntaxError {
                            message: "for-in loops declare exactly one variable".to_string(),
                        });
                    }
                    ForBinding::Var(decl)
                }
                Some(ForInit::Expr(expr)) => ForBinding::Expr(expr),
                None => missing_binding(self),
            };
            let target = self.parse_expression(false);
            let close_paren = self.loc(self.current().span);
            self.expect(TokenKind::RParen);
            let body = self.parse_statement();
            return self.stmt(
                StmtKind::ForIn(Box::new(ForInStmt {
                    each,
                    binding,
                    target,
                    close_paren,
                    body,
                })),
                start,
            );
        }

        if each {
            self.error_expected("'in'");
        }
        let first_semi = self.loc(self.current().span);
        self.expect(TokenKind::Semicolon);
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(false))
        };
        let second_semi = self.loc(self.current().span);
        self.expect(TokenKind::Semicolon);
        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression(false))
        };
        let close_paren = self.loc(self.current().span);
        self.expect(TokenKind::RParen);
        let body = self.parse_statement();
        self.stmt(
            StmtKind::For(Box::new(ForStmt {
                init,
                condition,
                update,
                first_semi,
                second_semi,
                close_paren,
                body,
            })),
            start,
        )
    }

    fn parse_switch(&mut self) -> Stmt {
        let start = self.start();
        self.advance();
        let discriminant = self.parse_paren_condition();
        let open_brace = self.loc(self.current().span);
        let mut cases = Vec::new();
        if self.expect(TokenKind::LBrace).is_some() {
            while matches!(self.current_kind(), TokenKind::Case | TokenKind::Default) {
                let case_start = self.start();
                let test = if self.eat(TokenKind::Case) {
                    Some(self.parse_expression(false))
                } else {
                    self.advance();
                    None
                };
                self.expect(TokenKind::Colon);
                let mut body = Vec::new();
                while !matches!(
                    self.current_kind(),
                    TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
                ) {
                    let before = self.pos;
                    body.push(self.parse_statement());
                    self.ensure_progress(before);
                }
                cases.push(SwitchCase {
                    test,
                    body,
                    loc: self.loc_from(case_start),
                });
            }
            self.expect(TokenKind::RBrace);
        }
        self.stmt(
            StmtKind::Switch {
                discriminant,
                open_brace,
                cases,
            },
            start,
        )
    }

    fn parse_try(&mut self) -> Stmt {
        let start = self.start();
        self.advance();
        let block = self.parse_block();
        let mut catches = Vec::new();
        while self.check(TokenKind::Catch) {
            let keyword = self.loc(self.current().span);
            self.advance();
            self.expect(TokenKind::LParen);
            let param = self.parse_identifier();
            let ty = self.parse_type_annotation();
            let close_paren = self.loc(self.current().span);
            self.expect(TokenKind::RParen);
            let body = self.parse_block();
            catches.push(CatchClause {
                keyword,
                param,
                ty,
                close_paren,
                body,
            });
        }
        let finally = if self.check(TokenKind::Finally) {
            let keyword = self.loc(self.current().span);
            self.advance();
            Some(FinallyClause {
                keyword,
                body: self.parse_block(),
            })
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            self.error_expected("'catch' or 'finally'");
        }
        self.stmt(
            StmtKind::Try(Box::new(TryStmt {
                block,
                catches,
                finally,
            })),
            start,
        )
    }

    // === Expressions ===

    fn parse_identifier(&mut self) -> Identifier {
        let span = self.current().span;
        if self.check(TokenKind::Ident) {
            self.advance();
            Identifier {
                name: SmolStr::new(span.slice(self.source).unwrap_or_default()),
                loc: self.loc(span),
                binding: Binding::Unresolved,
            }
        } else {
            self.error_expected("identifier");
            Identifier {
                name: SmolStr::default(),
                loc: self.loc(Span::empty(span.start)),
                binding: Binding::Unresolved,
            }
        }
    }

    /// Property names after `.` and member names may be keywords.
    fn parse_identifier_or_keyword(&mut self) -> Identifier {
        if self.current_kind().is_keyword() {
            let span = self.current().span;
            self.advance();
            Identifier {
                name: SmolStr::new(span.slice(self.source).unwrap_or_default()),
                loc: self.loc(span),
                binding: Binding::Unresolved,
            }
        } else {
            self.parse_identifier()
        }
    }

    /// Comma expression. `no_in` excludes the `in` operator at the top
    /// level, for loop heads.
    pub(crate) fn parse_expression(&mut self, no_in: bool) -> Expr {
        let start = self.start();
        let mut expr = self.parse_assignment(no_in);
        while self.check(TokenKind::Comma) {
            self.advance();
            let right = self.parse_assignment(no_in);
            expr = self.expr(
                ExprKind::Binary {
                    op: BinaryOp::Comma,
                    left: Box::new(expr),
                    right: Some(Box::new(right)),
                },
                start,
            );
        }
        expr
    }

    fn parse_assignment(&mut self, no_in: bool) -> Expr {
        let start = self.start();
        let target = self.parse_conditional(no_in);
        let Some(op) = assign_op(self.current_kind()) else {
            return target;
        };
        if !is_assignment_target(&target) {
            self.error(ParseErrorKind::InvalidAssignmentTarget);
        }
        self.advance();
        let value = self.parse_assignment(no_in);
        self.expr(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            start,
        )
    }

    fn parse_conditional(&mut self, no_in: bool) -> Expr {
        let start = self.start();
        let condition = self.parse_binary(0, no_in);
        if !self.eat(TokenKind::Question) {
            return condition;
        }
        let consequent = if self.check(TokenKind::Colon) {
            self.error_expected("expression");
            None
        } else {
            Some(Box::new(self.parse_assignment(false)))
        };
        let alternate = if self.eat(TokenKind::Colon) {
            if can_start_expression(self.current_kind()) {
                Some(Box::new(self.parse_assignment(no_in)))
            } else {
                self.error_expected("expression");
                None
            }
        } else {
            self.error_expected("':'");
            None
        };
        self.expr(
            ExprKind::Ternary {
                condition: Box::new(condition),
                consequent,
                alternate,
            },
            start,
        )
    }

    fn parse_binary(&mut self, min_precedence: u8, no_in: bool) -> Expr {
        let start = self.start();
        let mut left = self.parse_unary();
        loop {
            let Some(op) = binary_op(self.current_kind()) else {
                break;
            };
            if (no_in && op == BinaryOp::In) || op.precedence() < min_precedence {
                break;
            }
            self.advance();
            let right = if can_start_expression(self.current_kind()) {
                Some(Box::new(self.parse_binary(op.precedence() + 1, no_in)))
            } else {
                self.error_expected("expression");
                None
            };
            left = self.expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right,
                },
                start,
            );
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.start();
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::PlusPlus => UnaryOp::Increment,
            TokenKind::MinusMinus => UnaryOp::Decrement,
            TokenKind::Delete => UnaryOp::Delete,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::Void => UnaryOp::Void,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary();
        self.expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start,
        )
    }

    fn parse_postfix(&mut self) -> Expr {
        let start = self.start();
        let operand = self.parse_left_hand_side();
        let op = match self.current_kind() {
            TokenKind::PlusPlus if !self.newline_before_current() => PostfixOp::Increment,
            TokenKind::MinusMinus if !self.newline_before_current() => PostfixOp::Decrement,
            _ => return operand,
        };
        self.advance();
        self.expr(
            ExprKind::Postfix {
                op,
                operand: Box::new(operand),
            },
            start,
        )
    }

    fn parse_left_hand_side(&mut self) -> Expr {
        let start = self.start();
        let mut expr = if self.check(TokenKind::New) {
            self.parse_new()
        } else {
            self.parse_primary()
        };
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_identifier_or_keyword();
                    expr = self.expr(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        start,
                    );
                }
                TokenKind::DotDot => {
                    self.advance();
                    let name = self.parse_identifier_or_keyword();
                    expr = self.expr(
                        ExprKind::Descendants {
                            object: Box::new(expr),
                            name,
                        },
                        start,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression(false);
                    self.expect(TokenKind::RBracket);
                    expr = self.expr(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        start,
                    );
                }
                TokenKind::LParen => {
                    let arguments = self.parse_arguments();
                    expr = self.expr(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        start,
                    );
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_new(&mut self) -> Expr {
        let start = self.start();
        self.advance();
        let callee_start = self.start();
        let mut callee = self.parse_primary();
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_identifier_or_keyword();
                    callee = self.expr(
                        ExprKind::Member {
                            object: Box::new(callee),
                            property,
                        },
                        callee_start,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression(false);
                    self.expect(TokenKind::RBracket);
                    callee = self.expr(
                        ExprKind::Index {
                            object: Box::new(callee),
                            index: Box::new(index),
                        },
                        callee_start,
                    );
                }
                _ => break,
            }
        }
        let arguments = if self.check(TokenKind::LParen) {
            self.parse_arguments()
        } else {
            Vec::new()
        };
        self.expr(
            ExprKind::New {
                callee: Box::new(callee),
                arguments,
            },
            start,
        )
    }

    fn parse_arguments(&mut self) -> Vec<Expr> {
        let mut arguments = Vec::new();
        self.expect(TokenKind::LParen);
        while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
            arguments.push(self.parse_assignment(false));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen);
        arguments
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.start();
        let span = self.current().span;
        let text = self.current_text();
        match self.current_kind() {
            TokenKind::Ident if text == "undefined" => {
                self.advance();
                self.expr(ExprKind::Literal(Literal::Undefined), start)
            }
            TokenKind::Ident => {
                let ident = self.parse_identifier();
                self.expr(ExprKind::Identifier(ident), start)
            }
            TokenKind::Number => {
                self.advance();
                self.expr(ExprKind::Literal(Literal::Number(SmolStr::new(text))), start)
            }
            TokenKind::String => {
                self.advance();
                self.expr(ExprKind::Literal(Literal::String(SmolStr::new(text))), start)
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(TokenKind::True);
                self.advance();
                self.expr(ExprKind::Literal(Literal::Boolean(value)), start)
            }
            TokenKind::Null => {
                self.advance();
                self.expr(ExprKind::Literal(Literal::Null), start)
            }
            TokenKind::This => {
                self.advance();
                self.expr(ExprKind::This, start)
            }
            TokenKind::Super => {
                self.advance();
                self.expr(ExprKind::Super, start)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(false);
                self.expect(TokenKind::RParen);
                self.expr(ExprKind::Paren(Box::new(inner)), start)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.check(TokenKind::Eof) {
                    elements.push(self.parse_assignment(false));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket);
                self.expr(ExprKind::Array(elements), start)
            }
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Function => {
                self.advance();
                let function = self.parse_function_rest(start, false);
                self.expr(ExprKind::Function(Box::new(function)), start)
            }
            _ => {
                self.error_expected("expression");
                if !matches!(
                    self.current_kind(),
                    TokenKind::RParen
                        | TokenKind::RBrace
                        | TokenKind::RBracket
                        | TokenKind::Semicolon
                        | TokenKind::Eof
                ) {
                    self.advance();
                }
                Expr {
                    id: self.next_id(),
                    kind: ExprKind::Literal(Literal::Undefined),
                    loc: self.loc(Span::empty(span.start)),
                }
            }
        }
    }

    fn parse_object_literal(&mut self) -> Expr {
        let start = self.start();
        self.advance();
        let mut properties = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let key_span = self.current().span;
            let kind = self.current_kind();
            if matches!(kind, TokenKind::Ident | TokenKind::String | TokenKind::Number)
                || kind.is_keyword()
            {
                self.advance();
            } else {
                self.error_expected("property name");
                break;
            }
            let key = PropertyKey {
                text: SmolStr::new(key_span.slice(self.source).unwrap_or_default()),
                loc: self.loc(key_span),
            };
            self.expect(TokenKind::Colon);
            let value = self.parse_assignment(false);
            properties.push(Property {
                key,
                value,
                loc: self.loc_from(key_span.start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        self.expr(ExprKind::Object(properties), start)
    }
}

/// `for (in x)` has no binding; report it and fall back to an empty name.
fn missing_binding(parser: &mut Parser<'_>) -> ForBinding {
    parser.error_expected("loop variable");
    let start = parser.start();
    let ident = Identifier {
        name: SmolStr::default(),
        loc: parser.loc(Span::empty(start)),
        binding: Binding::Unresolved,
    };
    let expr = Expr {
        id: parser.next_id(),
        loc: ident.loc.clone(),
        kind: ExprKind::Identifier(ident),
    };
    ForBinding::Expr(expr)
}

fn member_name(kind: &MemberKind) -> &str {
    match kind {
        MemberKind::Field(field) => &field.name.name,
        MemberKind::Method(f)
        | MemberKind::Constructor(f)
        | MemberKind::Getter(f)
        | MemberKind::Setter(f) => f.name.as_ref().map_or("", |n| n.name.as_str()),
    }
}

fn is_assignment_target(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. } => true,
        ExprKind::Paren(inner) => is_assignment_target(inner),
        _ => false,
    }
}

fn can_start_expression(kind: TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::RParen
            | TokenKind::RBrace
            | TokenKind::RBracket
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::Eof
    )
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Rem,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::UShrEq => AssignOp::UShr,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::AmpAmpEq => AssignOp::And,
        TokenKind::PipePipeEq => AssignOp::Or,
        _ => return None,
    };
    Some(op)
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::NotEqEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::In => BinaryOp::In,
        TokenKind::Instanceof => BinaryOp::Instanceof,
        TokenKind::Is => BinaryOp::Is,
        TokenKind::As => BinaryOp::As,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::UShr => BinaryOp::UShr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}
