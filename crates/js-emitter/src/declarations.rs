//! Variables, functions and classes.
//!
//! Classes are written in Closure style: a constructor function assigned to
//! the qualified name, `goog.inherits` for the base class, and one assignment
//! per member onto the prototype (or the constructor for statics).

use crate::doc::{inline_type, JsDoc};
use crate::expressions::private_name;
use crate::writer::Emitter;
use as_parser::{
    Binding, ClassDecl, ClassMember, Declarator, Field, ForBinding, Function, Identifier,
    MemberKind, Param, TypeAnnotation, VarDecl, VarKind, Visibility,
};
use source_map::SourceLocation;

/// Where an inline type annotation maps to: the `:Type` clause, or the point
/// after the name when the type is implicit.
fn annotation_loc(name: &Identifier, ty: Option<&TypeAnnotation>) -> SourceLocation {
    ty.map_or_else(|| name.loc.at_end(), |t| t.loc.clone())
}

/// Where the `" = "` before an initializer maps to.
fn initializer_loc(name: &Identifier, ty: Option<&TypeAnnotation>) -> SourceLocation {
    ty.map_or_else(|| name.loc.at_end(), |t| t.loc.at_end())
}

impl Emitter<'_> {
    /// `var a = 1, b` without the terminating `;`.
    pub(crate) fn emit_var_decl(&mut self, decl: &VarDecl) {
        self.write_mapped("var ", &decl.loc);
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.write_mapped(", ", &decl.declarators[i - 1].loc.at_end());
            }
            self.emit_declarator(declarator, decl.kind);
        }
    }

    fn emit_declarator(&mut self, declarator: &Declarator, kind: VarKind) {
        let ty = declarator.static_type();
        self.write_mapped(
            &inline_type(&ty, kind == VarKind::Const),
            &annotation_loc(&declarator.name, declarator.ty.as_ref()),
        );
        self.write_mapped(&declarator.name.name, &declarator.name.loc);
        match &declarator.init {
            Some(init) => {
                self.write_mapped(
                    " = ",
                    &initializer_loc(&declarator.name, declarator.ty.as_ref()),
                );
                self.emit_value(init, &ty);
            }
            None if ty.is_integral() => self.write(" = 0"),
            None => {}
        }
    }

    pub(crate) fn emit_for_binding(&mut self, binding: &ForBinding) {
        match binding {
            ForBinding::Var(decl) => self.emit_var_decl(decl),
            ForBinding::Expr(expr) => self.emit_expr(expr),
        }
    }

    pub(crate) fn emit_function_decl(&mut self, function: &Function) {
        if self.options.emit_debug_comments {
            let mut doc = JsDoc::new();
            doc.signature(function);
            self.write_doc(&doc);
        }
        self.write_mapped("function ", &function.loc);
        match &function.name {
            Some(name) => self.write_mapped(&name.name, &name.loc),
            None => self.malformed("function name", &function.loc),
        }
        self.emit_function_tail(function);
    }

    /// Parameter list and body, from `(` onwards.
    pub(crate) fn emit_function_tail(&mut self, function: &Function) {
        self.write_mapped("(", &function.params_loc);
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.write_mapped(", ", &function.params[i - 1].loc.at_end());
            }
            self.emit_param(param);
        }
        self.write_mapped(")", &function.params_loc.before_end());
        self.write(" ");
        self.enter_function();
        self.emit_block(&function.body);
        self.exit_function();
    }

    fn emit_param(&mut self, param: &Param) {
        if param.rest {
            self.write_mapped("...", &param.loc);
        }
        self.write_mapped(&param.name.name, &param.name.loc);
        if let Some(default) = &param.default {
            self.write_mapped(" = ", &initializer_loc(&param.name, param.ty.as_ref()));
            self.emit_expr(default);
        }
    }

    pub(crate) fn emit_class(&mut self, class: &ClassDecl) {
        let outer = self.class.replace(class.qualified_name.clone());
        let qualified = class.qualified_name.as_str();
        let base = class.extends.as_ref().map(|base| {
            let name = match &base.binding {
                Binding::Class { qualified_name } => qualified_name.to_string(),
                _ => base.name.to_string(),
            };
            (base, name)
        });

        let mut doc = JsDoc::new();
        doc.tag("@constructor");
        if let Some((_, name)) = &base {
            doc.tag(format!("@extends {{{}}}", name));
        }
        let constructor = class.constructor();
        if let Some(constructor) = constructor {
            doc.signature(constructor);
        }
        self.write_doc(&doc);

        match constructor {
            Some(constructor) => {
                let name = constructor.name.as_ref().unwrap_or(&class.name);
                self.write_named(qualified, &name.loc, &name.name);
                self.write_mapped(" = function", &name.loc.at_end());
                self.emit_function_tail(constructor);
            }
            None => {
                self.write_named(qualified, &class.name.loc, &class.name.name);
                self.write_mapped(" = function() {", &class.name.loc.at_end());
                self.newline();
                self.write("}");
            }
        }
        self.write(";");

        if let Some((base, name)) = &base {
            self.newline();
            self.write_mapped("goog.inherits(", &base.loc);
            self.write(qualified);
            self.write(", ");
            self.write_named(name, &base.loc, &base.name);
            self.write(");");
        }

        for member in &class.members {
            if matches!(member.kind, MemberKind::Constructor(_)) {
                continue;
            }
            self.newline();
            self.newline();
            self.write_debug_comment(member.loc.start_line);
            self.emit_member(qualified, member);
        }
        self.class = outer;
    }

    fn emit_member(&mut self, class: &str, member: &ClassMember) {
        let modifiers = &member.modifiers;
        match &member.kind {
            MemberKind::Field(field) => {
                let mut doc = JsDoc::member(modifiers);
                if field.kind == VarKind::Const {
                    doc.tag("@const");
                }
                doc.tag(format!("@type {{{}}}", field.static_type().doc_name()));
                self.write_doc(&doc);
                self.emit_field(class, member, field);
            }
            MemberKind::Method(function) => {
                let mut doc = JsDoc::member(modifiers);
                doc.signature(function);
                self.write_doc(&doc);
                let Some(name) = &function.name else {
                    self.unsupported("anonymous method", &member.loc, true);
                    return;
                };
                self.emit_member_target(class, member, name);
                self.write_mapped(" = function", &name.loc.at_end());
                self.emit_function_tail(function);
                self.write_mapped(";", &member.loc.at_end());
            }
            MemberKind::Getter(_) => self.unsupported("getter", &member.loc, true),
            MemberKind::Setter(_) => self.unsupported("setter", &member.loc, true),
            MemberKind::Constructor(_) => {}
        }
    }

    fn emit_field(&mut self, class: &str, member: &ClassMember, field: &Field) {
        self.emit_member_target(class, member, &field.name);
        let ty = field.static_type();
        match &field.init {
            Some(init) => {
                self.write_mapped(" = ", &initializer_loc(&field.name, field.ty.as_ref()));
                self.emit_value(init, &ty);
            }
            None if ty.is_integral() => self.write(" = 0"),
            None => {}
        }
        self.write_mapped(";", &member.loc.at_end());
    }

    /// `Q.prototype.name` or `Q.name`; both parts map to the member's name.
    /// Private instance members are renamed, private statics keep their name.
    fn emit_member_target(&mut self, class: &str, member: &ClassMember, name: &Identifier) {
        let qualifier = if member.modifiers.is_static {
            format!("{}.", class)
        } else {
            format!("{}.prototype.", class)
        };
        self.write_mapped(&qualifier, &name.loc);
        if member.modifiers.visibility == Visibility::Private && !member.modifiers.is_static {
            self.write_named(&private_name(class, &name.name), &name.loc, &name.name);
        } else {
            self.write_mapped(&name.name, &name.loc);
        }
    }
}
