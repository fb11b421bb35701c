//! Expression emission.
//!
//! Every expression is written on one generated line. Operators and
//! punctuation are mapped independently of their operands, so a lookup on any
//! token of the output lands on the matching token of the source.

use crate::writer::Emitter;
use as_parser::{
    AssignOp, Binding, BinaryOp, Expr, ExprKind, Function, Identifier, MemberRef, StaticType, UnaryOp,
    Visibility,
};
use source_map::SourceLocation;

/// Name a private member is emitted under: `a.b.C` + `x` gives `a_b_C_x`.
pub(crate) fn private_name(class: &str, name: &str) -> String {
    format!("{}_{}", class.replace('.', "_"), name)
}

impl Emitter<'_> {
    pub(crate) fn emit_expr(&mut self, expr: &Expr) {
        let loc = &expr.loc;
        match &expr.kind {
            ExprKind::Identifier(ident) => self.emit_identifier(ident),
            ExprKind::Literal(literal) => self.write_mapped(literal.text(), loc),
            ExprKind::This => self.write_mapped("this", loc),
            ExprKind::Super => match self.class.clone() {
                Some(class) => self.write_mapped(&format!("{}.superClass_", class), loc),
                None => self.unsupported("super outside a class", loc, false),
            },
            ExprKind::Binary {
                op: op @ (BinaryOp::Is | BinaryOp::As),
                left,
                right,
            } => {
                let helper = if *op == BinaryOp::Is {
                    "Language.is("
                } else {
                    "Language.as("
                };
                self.write_mapped(helper, loc);
                self.emit_expr(left);
                self.write_mapped(", ", &left.loc.at_end());
                match right {
                    Some(right) => {
                        self.emit_expr(right);
                        self.write_mapped(")", &right.loc.at_end());
                    }
                    None => {
                        self.malformed("type operand", &left.loc.at_end());
                        self.write(")");
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                self.emit_expr(left);
                let operator = match op {
                    BinaryOp::Comma => ", ".to_string(),
                    op => format!(" {} ", op.as_str()),
                };
                self.write_mapped(&operator, &left.loc.at_end());
                match right {
                    Some(right) => self.emit_expr(right),
                    None => self.malformed("right operand", &left.loc.at_end()),
                }
            }
            ExprKind::Assign { op, target, value } => match op.logical_operator() {
                Some(logical) => self.emit_logical_assignment(expr, logical, target, value),
                None => {
                    self.emit_expr(target);
                    self.write_mapped(&format!(" {} ", op.as_str()), &target.loc.at_end());
                    if *op == AssignOp::Assign {
                        let ty = assigned_type(target);
                        self.emit_value(value, &ty);
                    } else {
                        self.emit_expr(value);
                    }
                }
            },
            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand, loc),
            ExprKind::Postfix { op, operand } => {
                self.emit_expr(operand);
                self.write_mapped(op.as_str(), &operand.loc.at_end());
            }
            ExprKind::Ternary {
                condition,
                consequent,
                alternate,
            } => {
                self.emit_expr(condition);
                self.write_mapped(" ? ", &condition.loc.at_end());
                let consequent_end = match consequent {
                    Some(consequent) => {
                        self.emit_expr(consequent);
                        consequent.loc.at_end()
                    }
                    None => {
                        self.malformed("consequent", &condition.loc.at_end());
                        condition.loc.at_end()
                    }
                };
                self.write_mapped(" : ", &consequent_end);
                match alternate {
                    Some(alternate) => self.emit_expr(alternate),
                    None => self.malformed("alternate", &consequent_end),
                }
            }
            ExprKind::Member { object, property } => {
                self.emit_expr(object);
                self.write_mapped(".", &object.loc.at_end());
                self.emit_property_name(property);
            }
            ExprKind::Index { object, index } => {
                self.emit_expr(object);
                self.write_mapped("[", &object.loc.at_end());
                self.emit_expr(index);
                self.write_mapped("]", &index.loc.at_end());
            }
            ExprKind::Call { callee, arguments } => match &callee.kind {
                ExprKind::Super => self.emit_super_call(callee, "constructor", arguments, loc),
                ExprKind::Member { object, property } if matches!(object.kind, ExprKind::Super) => {
                    self.emit_super_call(callee, &property.name, arguments, loc)
                }
                _ => {
                    self.emit_expr(callee);
                    self.write_mapped("(", &callee.loc.at_end());
                    self.emit_arguments(arguments);
                    self.write_mapped(")", &loc.before_end());
                }
            },
            ExprKind::New { callee, arguments } => {
                self.write_mapped("new ", loc);
                self.emit_expr(callee);
                self.write_mapped("(", &callee.loc.at_end());
                self.emit_arguments(arguments);
                self.write_mapped(")", &loc.before_end());
            }
            ExprKind::Paren(inner) => {
                self.write_mapped("(", loc);
                self.emit_expr(inner);
                self.write_mapped(")", &loc.before_end());
            }
            ExprKind::Object(properties) => {
                self.write_mapped("{", loc);
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        self.write_mapped(", ", &properties[i - 1].value.loc.at_end());
                    }
                    self.write_mapped(&property.key.text, &property.key.loc);
                    self.write_mapped(":", &property.key.loc.at_end());
                    self.emit_expr(&property.value);
                }
                self.write_mapped("}", &loc.before_end());
            }
            ExprKind::Array(elements) => {
                self.write_mapped("[", loc);
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write_mapped(", ", &elements[i - 1].loc.at_end());
                    }
                    self.emit_expr(element);
                }
                self.write_mapped("]", &loc.before_end());
            }
            ExprKind::Function(function) => self.emit_function_expr(function),
            ExprKind::Descendants { .. } => self.unsupported("E4X descendants", loc, false),
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr, loc: &SourceLocation) {
        match op {
            UnaryOp::Typeof => {
                self.write_mapped("typeof(", loc);
                self.emit_expr(operand);
                self.write_mapped(")", loc);
            }
            UnaryOp::Delete | UnaryOp::Void => {
                self.write_mapped(&format!("{} ", op.as_str()), loc);
                self.emit_expr(operand);
            }
            _ => {
                self.write_mapped(op.as_str(), loc);
                // `- -a` must not become `--a`
                if let ExprKind::Unary { op: inner, .. } = &operand.kind {
                    let clash = matches!(
                        (op, inner),
                        (UnaryOp::Neg, UnaryOp::Neg | UnaryOp::Decrement)
                            | (UnaryOp::Plus, UnaryOp::Plus | UnaryOp::Increment)
                    );
                    if clash {
                        self.write(" ");
                    }
                }
                self.emit_expr(operand);
            }
        }
    }

    /// Arguments separated by `", "`, each separator mapped to the end of the
    /// argument before it.
    fn emit_arguments(&mut self, arguments: &[Expr]) {
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.write_mapped(", ", &arguments[i - 1].loc.at_end());
            }
            self.emit_expr(argument);
        }
    }

    /// `super(...)` and `super.m(...)` become `Q.base(this, 'm', ...)`.
    fn emit_super_call(
        &mut self,
        callee: &Expr,
        method: &str,
        arguments: &[Expr],
        loc: &SourceLocation,
    ) {
        let Some(class) = self.class.clone() else {
            self.unsupported("super outside a class", loc, false);
            return;
        };
        self.write_mapped(&format!("{}.base(this, '{}'", class, method), &callee.loc);
        let mut previous = callee.loc.at_end();
        for argument in arguments {
            self.write_mapped(", ", &previous);
            self.emit_expr(argument);
            previous = argument.loc.at_end();
        }
        self.write_mapped(")", &loc.before_end());
    }

    /// An identifier, qualified when it refers to a class member or a class of
    /// this unit.
    pub(crate) fn emit_identifier(&mut self, ident: &Identifier) {
        match &ident.binding {
            Binding::Member(member) => {
                let qualifier = if member.is_static {
                    format!("{}.", member.class)
                } else {
                    "this.".to_string()
                };
                self.write_mapped(&qualifier, &ident.loc);
                self.emit_member_name(ident, member);
            }
            Binding::Class { qualified_name } => {
                self.write_named(qualified_name, &ident.loc, &ident.name)
            }
            Binding::Local { .. } | Binding::Unresolved => {
                self.write_mapped(&ident.name, &ident.loc)
            }
        }
    }

    /// The property of a member access; private instance members are renamed.
    fn emit_property_name(&mut self, property: &Identifier) {
        match &property.binding {
            Binding::Member(member) => self.emit_member_name(property, member),
            _ => self.write_mapped(&property.name, &property.loc),
        }
    }

    fn emit_member_name(&mut self, ident: &Identifier, member: &MemberRef) {
        if member.visibility == Visibility::Private && !member.is_static {
            let name = private_name(&member.class, &ident.name);
            self.write_named(&name, &ident.loc, &ident.name);
        } else {
            self.write_mapped(&ident.name, &ident.loc);
        }
    }

    fn emit_function_expr(&mut self, function: &Function) {
        self.write_mapped("function", &function.loc);
        if let Some(name) = &function.name {
            self.write(" ");
            self.write_mapped(&name.name, &name.loc);
        }
        self.emit_function_tail(function);
    }
}

/// Static type of an assignment target, for compile-time coercion.
fn assigned_type(target: &Expr) -> StaticType {
    match &target.kind {
        ExprKind::Identifier(ident) => ident.binding.static_type(),
        ExprKind::Member { property, .. } => property.binding.static_type(),
        _ => StaticType::Any,
    }
}
