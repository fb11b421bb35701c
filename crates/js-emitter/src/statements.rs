//! Statement emission.
//!
//! Statements start at the current position and leave the sink right after
//! their last token; callers own the line breaks between them. A block body
//! follows its header on the same line, any other body goes on the next line,
//! one level deeper.

use crate::writer::Emitter;
use as_parser::{Block, Expr, ForInit, ForStmt, Identifier, Stmt, StmtKind, TryStmt};
use source_map::SourceLocation;

impl Emitter<'_> {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) {
        let loc = &stmt.loc;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.emit_expr(expr);
                self.write_mapped(";", &loc.at_end());
            }
            StmtKind::Var(decl) => {
                self.emit_var_decl(decl);
                self.write_mapped(";", &loc.at_end());
            }
            StmtKind::Block(block) => self.emit_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write_mapped("if (", loc);
                self.emit_expr(condition);
                self.write_mapped(close_paren(then_branch), &condition.loc.at_end());
                self.emit_body(then_branch);
                if let Some(clause) = else_branch {
                    if is_braced(then_branch) {
                        self.write(" ");
                    } else {
                        self.newline();
                    }
                    self.write_mapped("else", &clause.keyword);
                    match &clause.body.kind {
                        StmtKind::If { .. } => {
                            self.write(" ");
                            self.emit_stmt(&clause.body);
                        }
                        _ => {
                            if is_braced(&clause.body) {
                                self.write(" ");
                            }
                            self.emit_body(&clause.body);
                        }
                    }
                }
            }
            StmtKind::For(for_stmt) => self.emit_for(loc, for_stmt),
            StmtKind::ForIn(for_in) if for_in.each => self.emit_for_each(stmt, for_in, None),
            StmtKind::ForIn(for_in) => {
                self.write_mapped("for (", loc);
                self.emit_for_binding(&for_in.binding);
                self.write_mapped(" in ", &for_in.binding.loc().at_end());
                self.emit_expr(&for_in.target);
                self.write_mapped(close_paren(&for_in.body), &for_in.close_paren);
                self.emit_body(&for_in.body);
            }
            StmtKind::While { condition, body } => {
                self.write_mapped("while (", loc);
                self.emit_expr(condition);
                self.write_mapped(close_paren(body), &condition.loc.at_end());
                self.emit_body(body);
            }
            StmtKind::DoWhile {
                body,
                while_keyword,
                condition,
            } => {
                if is_braced(body) {
                    self.write_mapped("do ", loc);
                    self.emit_body(body);
                    self.write_mapped(" while (", while_keyword);
                } else {
                    self.write_mapped("do", loc);
                    self.emit_body(body);
                    self.newline();
                    self.write_mapped("while (", while_keyword);
                }
                self.emit_expr(condition);
                self.write_mapped(")", &condition.loc.at_end());
                self.write_mapped(";", &loc.at_end());
            }
            StmtKind::Switch {
                discriminant,
                open_brace,
                cases,
            } => {
                self.write_mapped("switch (", loc);
                self.emit_expr(discriminant);
                self.write_mapped(") ", &discriminant.loc.at_end());
                self.write_mapped("{", open_brace);
                self.indent();
                for case in cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.write_mapped("case ", &case.loc);
                            self.emit_expr(test);
                            self.write_mapped(":", &test.loc.at_end());
                        }
                        None => self.write_mapped("default:", &case.loc),
                    }
                    self.indent();
                    for stmt in &case.body {
                        match &stmt.kind {
                            StmtKind::Block(block) => self.emit_statements(&block.stmts),
                            _ => self.emit_statements(std::slice::from_ref(stmt)),
                        }
                    }
                    self.dedent();
                }
                self.dedent();
                self.newline();
                self.write_mapped("}", &loc.before_end());
            }
            StmtKind::Try(try_stmt) => self.emit_try(loc, try_stmt),
            StmtKind::Return(value) => self.emit_terminated("return", value.as_ref(), loc),
            StmtKind::Throw(Some(value)) => self.emit_terminated("throw", Some(value), loc),
            StmtKind::Throw(None) => {
                self.write_mapped("throw ", loc);
                self.malformed("thrown value", &loc.at_end());
                self.write_mapped(";", &loc.at_end());
            }
            StmtKind::Break(label) => self.emit_jump("break", label.as_ref(), loc),
            StmtKind::Continue(label) => self.emit_jump("continue", label.as_ref(), loc),
            StmtKind::With { object, body } => {
                self.write_mapped("with (", loc);
                self.emit_expr(object);
                self.write_mapped(close_paren(body), &object.loc.at_end());
                self.emit_body(body);
            }
            StmtKind::Labeled { label, body } => match &body.kind {
                StmtKind::ForIn(for_each) if for_each.each => {
                    self.emit_for_each(body, for_each, Some(label))
                }
                _ => {
                    self.write_mapped(&label.name, &label.loc);
                    self.write_mapped(": ", &label.loc.at_end());
                    self.emit_stmt(body);
                }
            },
            StmtKind::Function(function) => self.emit_function_decl(function),
            StmtKind::Class(class) => self.emit_class(class),
            StmtKind::Import(_) => {}
            StmtKind::UseNamespace(_) => self.unsupported("use namespace", loc, true),
            StmtKind::Empty => self.write_mapped(";", loc),
        }
    }

    /// Each statement on its own line at the current indentation.
    pub(crate) fn emit_statements(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if matches!(stmt.kind, StmtKind::Import(_)) {
                continue;
            }
            self.newline();
            self.emit_stmt(stmt);
        }
    }

    pub(crate) fn emit_block(&mut self, block: &Block) {
        self.write_mapped("{", &block.loc);
        self.indent();
        self.emit_statements(&block.stmts);
        self.dedent();
        self.newline();
        self.write_mapped("}", &block.loc.before_end());
    }

    /// The body of a compound statement. A `for each` expands to two
    /// statements, so it is wrapped in braces when it stands alone, label
    /// included.
    fn emit_body(&mut self, body: &Stmt) {
        match &body.kind {
            StmtKind::Block(block) => self.emit_block(block),
            _ if is_for_each(body) => {
                self.write_mapped("{", &body.loc);
                self.indent();
                self.newline();
                self.emit_stmt(body);
                self.dedent();
                self.newline();
                self.write_mapped("}", &body.loc.before_end());
            }
            _ => {
                self.indent();
                self.newline();
                self.emit_stmt(body);
                self.dedent();
            }
        }
    }

    fn emit_for(&mut self, loc: &SourceLocation, for_stmt: &ForStmt) {
        self.write_mapped("for (", loc);
        match &for_stmt.init {
            Some(ForInit::Var(decl)) => self.emit_var_decl(decl),
            Some(ForInit::Expr(expr)) => self.emit_expr(expr),
            None => {}
        }
        let first = if for_stmt.condition.is_some() { "; " } else { ";" };
        self.write_mapped(first, &for_stmt.first_semi);
        if let Some(condition) = &for_stmt.condition {
            self.emit_expr(condition);
        }
        let second = if for_stmt.update.is_some() { "; " } else { ";" };
        self.write_mapped(second, &for_stmt.second_semi);
        if let Some(update) = &for_stmt.update {
            self.emit_expr(update);
        }
        self.write_mapped(close_paren(&for_stmt.body), &for_stmt.close_paren);
        self.emit_body(&for_stmt.body);
    }

    fn emit_try(&mut self, loc: &SourceLocation, try_stmt: &TryStmt) {
        self.write_mapped("try ", loc);
        self.emit_block(&try_stmt.block);
        for catch in &try_stmt.catches {
            self.write_mapped(" catch (", &catch.keyword);
            self.write_mapped(&catch.param.name, &catch.param.loc);
            self.write_mapped(") ", &catch.close_paren);
            self.emit_block(&catch.body);
        }
        if let Some(finally) = &try_stmt.finally {
            self.write_mapped(" finally ", &finally.keyword);
            self.emit_block(&finally.body);
        }
    }

    /// `return`/`throw` with an optional value.
    fn emit_terminated(
        &mut self,
        keyword: &str,
        value: Option<&Expr>,
        loc: &SourceLocation,
    ) {
        match value {
            Some(value) => {
                self.write_mapped(&format!("{} ", keyword), loc);
                self.emit_expr(value);
            }
            None => self.write_mapped(keyword, loc),
        }
        self.write_mapped(";", &loc.at_end());
    }

    fn emit_jump(&mut self, keyword: &str, label: Option<&Identifier>, loc: &SourceLocation) {
        match label {
            Some(label) => {
                self.write_mapped(&format!("{} ", keyword), loc);
                self.write_mapped(&label.name, &label.loc);
            }
            None => self.write_mapped(keyword, loc),
        }
        self.write_mapped(";", &loc.at_end());
    }
}

fn is_braced(body: &Stmt) -> bool {
    matches!(body.kind, StmtKind::Block(_)) || is_for_each(body)
}

/// A `for each`, labeled or not. It expands to more than one statement.
fn is_for_each(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::ForIn(for_in) => for_in.each,
        StmtKind::Labeled { body, .. } => {
            matches!(&body.kind, StmtKind::ForIn(for_in) if for_in.each)
        }
        _ => false,
    }
}

fn close_paren(body: &Stmt) -> &'static str {
    if is_braced(body) {
        ") "
    } else {
        ")"
    }
}
