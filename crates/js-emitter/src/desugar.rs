//! Constructs rewritten into plain JavaScript: `for each` loops and the
//! logical compound assignments `&&=` and `||=`.

use crate::doc::inline_type;
use crate::writer::Emitter;
use as_parser::{BinaryOp, Expr, ForBinding, ForInStmt, Identifier, Stmt, StmtKind, VarKind};

impl Emitter<'_> {
    /// `a &&= b` becomes `a = a && b`.
    ///
    /// The inserted `=` and the logical operator both map to the end of `a`,
    /// where the source operator starts; the repeated `a` maps to the start of
    /// the whole expression. When `a` is not a plain name the repeat is
    /// rendered once more and mapped as a single token.
    pub(crate) fn emit_logical_assignment(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        target: &Expr,
        value: &Expr,
    ) {
        let operator = target.loc.at_end();
        self.emit_expr(target);
        self.write_mapped(" = ", &operator);

        let mut scratch = self.detached();
        scratch.emit_expr(target);
        let repeated = scratch.into_text();
        self.write_mapped(&repeated, &expr.loc);

        self.write_mapped(&format!(" {} ", op.as_str()), &operator);
        self.emit_expr(value);
    }

    /// Writes a `for each` loop as a `for ... in` over a hoisted target:
    ///
    /// ```text
    /// var foreachiter0_target = expr;
    /// for (var foreachiter0 in foreachiter0_target) {
    ///   var x = foreachiter0_target[foreachiter0];
    ///   ...
    /// }
    /// ```
    ///
    /// A label on the loop moves to the generated `for`.
    pub(crate) fn emit_for_each(
        &mut self,
        stmt: &Stmt,
        for_each: &ForInStmt,
        label: Option<&Identifier>,
    ) {
        let iter = self.next_foreach_name();
        let target_name = format!("{}_target", iter);
        let target = &for_each.target;

        self.write_mapped(&format!("var {} = ", target_name), &target.loc);
        self.emit_expr(target);
        self.write_mapped(";", &target.loc);
        self.newline();

        if let Some(label) = label {
            self.write_mapped(&label.name, &label.loc);
            self.write_mapped(": ", &label.loc.at_end());
        }
        self.write_mapped("for (", &stmt.loc);
        self.write_mapped(&format!("var {}", iter), &target.loc);
        self.write(" in ");
        self.write_mapped(&target_name, &target.loc);
        self.write_mapped(") ", &for_each.close_paren);

        let body = &for_each.body;
        self.write_mapped("{", &body.loc);
        self.indent();
        self.newline();
        match &for_each.binding {
            ForBinding::Var(decl) => {
                self.write_mapped("var ", &decl.loc);
                if let Some(declarator) = decl.declarators.first() {
                    let annotation = declarator
                        .ty
                        .as_ref()
                        .map_or_else(|| declarator.name.loc.at_end(), |t| t.loc.clone());
                    self.write_mapped(
                        &inline_type(&declarator.static_type(), decl.kind == VarKind::Const),
                        &annotation,
                    );
                    self.write_mapped(&declarator.name.name, &declarator.name.loc);
                    self.write_mapped(" = ", &decl.loc.at_end());
                }
            }
            ForBinding::Expr(binding) => {
                self.emit_expr(binding);
                self.write_mapped(" = ", &binding.loc);
            }
        }
        self.write_mapped(&format!("{}[{}];", target_name, iter), &target.loc);

        match &body.kind {
            StmtKind::Block(block) => self.emit_statements(&block.stmts),
            _ => {
                self.newline();
                self.emit_stmt(body);
            }
        }
        self.dedent();
        self.newline();
        self.write_mapped("}", &body.loc.before_end());
    }
}
