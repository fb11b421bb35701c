//! Name resolution: attaches a [`Binding`] to every identifier reference.
//!
//! Lookup order is function scopes from the innermost outwards, then members
//! of the enclosing class, then unit-level declarations, then classes
//! declared in the unit. `var` declarations are function scoped and hoisted.

use crate::ast::*;
use crate::types::StaticType;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

type Scope = FxHashMap<SmolStr, Binding>;

struct ClassContext {
    qualified_name: SmolStr,
    members: FxHashMap<SmolStr, MemberRef>,
}

struct Resolver {
    /// `scopes[0]` holds unit-level declarations.
    scopes: Vec<Scope>,
    class: Option<ClassContext>,
    classes: FxHashMap<SmolStr, SmolStr>,
}

/// Resolves every identifier in `unit` and records its compile-time
/// constants.
pub fn resolve(unit: &mut CompilationUnit) {
    let mut unit_scope = Scope::default();
    declare_hoisted(&unit.body, &mut unit_scope);
    let classes = unit
        .classes()
        .map(|c| (c.name.name.clone(), c.qualified_name.clone()))
        .collect();

    let mut resolver = Resolver {
        scopes: vec![unit_scope],
        class: None,
        classes,
    };
    for stmt in &mut unit.body {
        resolver.stmt(stmt);
    }

    let mut constants = FxHashMap::default();
    collect_constants(&unit.body, &mut constants);
    unit.constants = constants;
}

impl Resolver {
    fn lookup(&self, name: &str) -> Binding {
        for scope in self.scopes.iter().skip(1).rev() {
            if let Some(binding) = scope.get(name) {
                return binding.clone();
            }
        }
        if let Some(member) = self.class.as_ref().and_then(|c| c.members.get(name)) {
            return Binding::Member(member.clone());
        }
        if let Some(binding) = self.scopes.first().and_then(|s| s.get(name)) {
            return binding.clone();
        }
        match self.classes.get(name) {
            Some(qualified_name) => Binding::Class {
                qualified_name: qualified_name.clone(),
            },
            None => Binding::Unresolved,
        }
    }

    fn enter_function(&mut self, function: &mut Function) {
        let mut scope = Scope::default();
        for param in &function.params {
            scope.insert(
                param.name.name.clone(),
                Binding::Local {
                    ty: param.ty.as_ref().map_or(StaticType::Any, |t| t.ty.clone()),
                    constant: None,
                },
            );
        }
        declare_hoisted(&function.body.stmts, &mut scope);

        for param in &mut function.params {
            if let Some(default) = &mut param.default {
                self.expr(default);
            }
        }
        self.scopes.push(scope);
        for param in &mut function.params {
            param.name.binding = self.lookup(&param.name.name);
        }
        for stmt in &mut function.body.stmts {
            self.stmt(stmt);
        }
        self.scopes.pop();
    }

    fn enter_class(&mut self, class: &mut ClassDecl) {
        let members = class
            .members
            .iter()
            .filter_map(|member| {
                let (name, ty, constant) = match &member.kind {
                    MemberKind::Field(field) => {
                        let constant = (field.kind == VarKind::Const && field.init.is_some())
                            .then_some(member.id);
                        (field.name.name.clone(), field.static_type(), constant)
                    }
                    MemberKind::Method(f) => (f.name.as_ref()?.name.clone(), StaticType::Function, None),
                    MemberKind::Getter(f) | MemberKind::Setter(f) => (
                        f.name.as_ref()?.name.clone(),
                        f.return_type.as_ref().map_or(StaticType::Any, |t| t.ty.clone()),
                        None,
                    ),
                    MemberKind::Constructor(_) => return None,
                };
                Some((
                    name,
                    MemberRef {
                        class: class.qualified_name.clone(),
                        is_static: member.modifiers.is_static,
                        visibility: member.modifiers.visibility,
                        ty,
                        constant,
                    },
                ))
            })
            .collect();

        let outer = self.class.replace(ClassContext {
            qualified_name: class.qualified_name.clone(),
            members,
        });
        if let Some(extends) = &mut class.extends {
            extends.binding = self.lookup(&extends.name);
        }
        for member in &mut class.members {
            match &mut member.kind {
                MemberKind::Field(field) => {
                    if let Some(init) = &mut field.init {
                        self.expr(init);
                    }
                }
                MemberKind::Method(f)
                | MemberKind::Constructor(f)
                | MemberKind::Getter(f)
                | MemberKind::Setter(f) => self.enter_function(f),
            }
        }
        self.class = outer;
    }

    fn var_decl(&mut self, decl: &mut VarDecl) {
        for declarator in &mut decl.declarators {
            if let Some(init) = &mut declarator.init {
                self.expr(init);
            }
            declarator.name.binding = self.lookup(&declarator.name.name);
        }
    }

    fn block(&mut self, block: &mut Block) {
        for stmt in &mut block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Var(decl) => self.var_decl(decl),
            StmtKind::Block(block) => self.block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.stmt(then_branch);
                if let Some(clause) = else_branch {
                    self.stmt(&mut clause.body);
                }
            }
            StmtKind::For(for_stmt) => {
                match &mut for_stmt.init {
                    Some(ForInit::Var(decl)) => self.var_decl(decl),
                    Some(ForInit::Expr(expr)) => self.expr(expr),
                    None => {}
                }
                if let Some(condition) = &mut for_stmt.condition {
                    self.expr(condition);
                }
                if let Some(update) = &mut for_stmt.update {
                    self.expr(update);
                }
                self.stmt(&mut for_stmt.body);
            }
            StmtKind::ForIn(for_in) => {
                match &mut for_in.binding {
                    ForBinding::Var(decl) => self.var_decl(decl),
                    ForBinding::Expr(expr) => self.expr(expr),
                }
                self.expr(&mut for_in.target);
                self.stmt(&mut for_in.body);
            }
            StmtKind::While { condition, body } => {
                self.expr(condition);
                self.stmt(body);
            }
            StmtKind::DoWhile {
                body, condition, ..
            } => {
                self.stmt(body);
                self.expr(condition);
            }
            StmtKind::Switch {
                discriminant,
                cases,
                ..
            } => {
                self.expr(discriminant);
                for case in cases {
                    if let Some(test) = &mut case.test {
                        self.expr(test);
                    }
                    for stmt in &mut case.body {
                        self.stmt(stmt);
                    }
                }
            }
            StmtKind::Try(try_stmt) => {
                self.block(&mut try_stmt.block);
                for catch in &mut try_stmt.catches {
                    catch.param.binding = self.lookup(&catch.param.name);
                    self.block(&mut catch.body);
                }
                if let Some(finally) = &mut try_stmt.finally {
                    self.block(&mut finally.body);
                }
            }
            StmtKind::Return(value) | StmtKind::Throw(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::With { object, body } => {
                self.expr(object);
                self.stmt(body);
            }
            StmtKind::Labeled { body, .. } => self.stmt(body),
            StmtKind::Function(function) => {
                if let Some(name) = &mut function.name {
                    name.binding = self.lookup(&name.name);
                }
                self.enter_function(function);
            }
            StmtKind::Class(class) => self.enter_class(class),
            StmtKind::Break(_)
            | StmtKind::Continue(_)
            | StmtKind::Import(_)
            | StmtKind::UseNamespace(_)
            | StmtKind::Empty => {}
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Identifier(ident) => ident.binding = self.lookup(&ident.name),
            ExprKind::Literal(_) | ExprKind::This | ExprKind::Super => {}
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                if let Some(right) = right {
                    self.expr(right);
                }
            }
            ExprKind::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            ExprKind::Unary { operand, .. } | ExprKind::Postfix { operand, .. } => {
                self.expr(operand)
            }
            ExprKind::Ternary {
                condition,
                consequent,
                alternate,
            } => {
                self.expr(condition);
                if let Some(consequent) = consequent {
                    self.expr(consequent);
                }
                if let Some(alternate) = alternate {
                    self.expr(alternate);
                }
            }
            ExprKind::Member { object, property } => {
                self.expr(object);
                property.binding = self.member_binding(object, &property.name);
            }
            ExprKind::Index { object, index } => {
                self.expr(object);
                self.expr(index);
            }
            ExprKind::Call { callee, arguments } | ExprKind::New { callee, arguments } => {
                self.expr(callee);
                for argument in arguments {
                    self.expr(argument);
                }
            }
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::Object(properties) => {
                for property in properties {
                    self.expr(&mut property.value);
                }
            }
            ExprKind::Array(elements) => {
                for element in elements {
                    self.expr(element);
                }
            }
            ExprKind::Function(function) => {
                let mut scope = Scope::default();
                if let Some(name) = &function.name {
                    scope.insert(
                        name.name.clone(),
                        Binding::Local {
                            ty: StaticType::Function,
                            constant: None,
                        },
                    );
                }
                self.scopes.push(scope);
                self.enter_function(function);
                self.scopes.pop();
            }
            ExprKind::Descendants { object, .. } => self.expr(object),
        }
    }

    /// Binding of `property` in `object.property` when the object is `this`
    /// or the enclosing class itself.
    fn member_binding(&self, object: &Expr, property: &str) -> Binding {
        let Some(class) = &self.class else {
            return Binding::Unresolved;
        };
        let wants_static = match &object.kind {
            ExprKind::This => false,
            ExprKind::Identifier(ident) => match &ident.binding {
                Binding::Class { qualified_name } if *qualified_name == class.qualified_name => true,
                _ => return Binding::Unresolved,
            },
            _ => return Binding::Unresolved,
        };
        match class.members.get(property) {
            Some(member) if member.is_static == wants_static => Binding::Member(member.clone()),
            _ => Binding::Unresolved,
        }
    }
}

/// Declares every `var`, `const`, nested function and catch parameter of a
/// function body, without descending into nested functions or classes.
fn declare_hoisted(stmts: &[Stmt], scope: &mut Scope) {
    for stmt in stmts {
        declare_stmt(stmt, scope);
    }
}

fn declare_var(decl: &VarDecl, scope: &mut Scope) {
    for declarator in &decl.declarators {
        let constant =
            (decl.kind == VarKind::Const && declarator.init.is_some()).then_some(declarator.id);
        scope.insert(
            declarator.name.name.clone(),
            Binding::Local {
                ty: declarator.static_type(),
                constant,
            },
        );
    }
}

fn declare_stmt(stmt: &Stmt, scope: &mut Scope) {
    match &stmt.kind {
        StmtKind::Var(decl) => declare_var(decl, scope),
        StmtKind::Block(block) => declare_hoisted(&block.stmts, scope),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            declare_stmt(then_branch, scope);
            if let Some(clause) = else_branch {
                declare_stmt(&clause.body, scope);
            }
        }
        StmtKind::For(for_stmt) => {
            if let Some(ForInit::Var(decl)) = &for_stmt.init {
                declare_var(decl, scope);
            }
            declare_stmt(&for_stmt.body, scope);
        }
        StmtKind::ForIn(for_in) => {
            if let ForBinding::Var(decl) = &for_in.binding {
                declare_var(decl, scope);
            }
            declare_stmt(&for_in.body, scope);
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::With { body, .. }
        | StmtKind::Labeled { body, .. } => declare_stmt(body, scope),
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                declare_hoisted(&case.body, scope);
            }
        }
        StmtKind::Try(try_stmt) => {
            declare_hoisted(&try_stmt.block.stmts, scope);
            for catch in &try_stmt.catches {
                scope.insert(
                    catch.param.name.clone(),
                    Binding::Local {
                        ty: catch.ty.as_ref().map_or(StaticType::Any, |t| t.ty.clone()),
                        constant: None,
                    },
                );
                declare_hoisted(&catch.body.stmts, scope);
            }
            if let Some(finally) = &try_stmt.finally {
                declare_hoisted(&finally.body.stmts, scope);
            }
        }
        StmtKind::Function(function) => {
            if let Some(name) = &function.name {
                scope.insert(
                    name.name.clone(),
                    Binding::Local {
                        ty: StaticType::Function,
                        constant: None,
                    },
                );
            }
        }
        StmtKind::Expr(_)
        | StmtKind::Return(_)
        | StmtKind::Throw(_)
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Class(_)
        | StmtKind::Import(_)
        | StmtKind::UseNamespace(_)
        | StmtKind::Empty => {}
    }
}

/// Records the initializer of every `const` with one, keyed by its
/// declarator or class member.
fn collect_constants(stmts: &[Stmt], constants: &mut FxHashMap<NodeId, Expr>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Var(decl) if decl.kind == VarKind::Const => {
                for declarator in &decl.declarators {
                    if let Some(init) = &declarator.init {
                        constants.insert(declarator.id, init.clone());
                    }
                }
            }
            StmtKind::Block(block) => collect_constants(&block.stmts, constants),
            StmtKind::Function(function) => collect_constants(&function.body.stmts, constants),
            StmtKind::Class(class) => {
                for member in &class.members {
                    match &member.kind {
                        MemberKind::Field(Field {
                            kind: VarKind::Const,
                            init: Some(init),
                            ..
                        }) => {
                            constants.insert(member.id, init.clone());
                        }
                        MemberKind::Method(f) | MemberKind::Constructor(f) => {
                            collect_constants(&f.body.stmts, constants)
                        }
                        _ => {}
                    }
                }
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_constants(std::slice::from_ref(then_branch.as_ref()), constants);
                if let Some(clause) = else_branch {
                    collect_constants(std::slice::from_ref(clause.body.as_ref()), constants);
                }
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::With { body, .. }
            | StmtKind::Labeled { body, .. } => {
                collect_constants(std::slice::from_ref(body.as_ref()), constants)
            }
            StmtKind::For(for_stmt) => {
                collect_constants(std::slice::from_ref(&for_stmt.body), constants)
            }
            StmtKind::ForIn(for_in) => {
                collect_constants(std::slice::from_ref(&for_in.body), constants)
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    collect_constants(&case.body, constants);
                }
            }
            StmtKind::Try(try_stmt) => {
                collect_constants(&try_stmt.block.stmts, constants);
                for catch in &try_stmt.catches {
                    collect_constants(&catch.body.stmts, constants);
                }
                if let Some(finally) = &try_stmt.finally {
                    collect_constants(&finally.body.stmts, constants);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, ParseOptions};
    use crate::ast::*;
    use crate::types::StaticType;

    fn unit(source: &str) -> CompilationUnit {
        let result = parse(source, &ParseOptions::default());
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        result.unit
    }

    fn expr_stmt(stmt: &Stmt) -> &Expr {
        match &stmt.kind {
            StmtKind::Expr(expr) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn assign_target(expr: &Expr) -> &Expr {
        match &expr.kind {
            ExprKind::Assign { target, .. } => target,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_hoisted_local_type() {
        let unit = unit("a = 1.5;\nvar a:int;");
        let ExprKind::Identifier(ident) = &assign_target(expr_stmt(&unit.body[0])).kind else {
            panic!("expected identifier");
        };
        assert_eq!(ident.binding.static_type(), StaticType::Int);
    }

    #[test]
    fn test_constants_are_recorded() {
        let unit = unit("const A:int = 2;\nconst B:int = A * 3;\nvar c:int = B;");
        assert_eq!(unit.constants.len(), 2);
        let StmtKind::Var(decl) = &unit.body[2].kind else {
            panic!("expected var");
        };
        let Some(Expr {
            kind: ExprKind::Identifier(ident),
            ..
        }) = &decl.declarators[0].init
        else {
            panic!("expected identifier initializer");
        };
        let id = ident.binding.constant().unwrap();
        assert!(unit.constants.contains_key(&id));
        // The stored initializer is the resolved one.
        let Some(ExprKind::Binary { left, .. }) = unit.constants.get(&id).map(|e| &e.kind) else {
            panic!("expected binary initializer");
        };
        let ExprKind::Identifier(a) = &left.kind else {
            panic!("expected identifier");
        };
        assert!(a.binding.constant().is_some());
    }

    #[test]
    fn test_implicit_members() {
        let unit = unit(
            "package p {\nclass A {\n  private var x:uint;\n  static var s:int;\n  function f(x:String):void { x = 'a'; s = 1; this.x = 2; }\n}\n}",
        );
        let class = unit.classes().next().unwrap();
        let MemberKind::Method(f) = &class.members[2].kind else {
            panic!("expected method");
        };
        let stmts = &f.body.stmts;

        // Parameter shadows the field.
        let ExprKind::Identifier(param) = &assign_target(expr_stmt(&stmts[0])).kind else {
            panic!("expected identifier");
        };
        assert_eq!(param.binding.static_type(), StaticType::String);

        let ExprKind::Identifier(s) = &assign_target(expr_stmt(&stmts[1])).kind else {
            panic!("expected identifier");
        };
        let Binding::Member(member) = &s.binding else {
            panic!("expected member binding, got {:?}", s.binding);
        };
        assert!(member.is_static);
        assert_eq!(member.class, "p.A");

        let ExprKind::Member { property, .. } = &assign_target(expr_stmt(&stmts[2])).kind else {
            panic!("expected member access");
        };
        let Binding::Member(member) = &property.binding else {
            panic!("expected member binding");
        };
        assert_eq!(member.visibility, Visibility::Private);
        assert_eq!(member.ty, StaticType::Uint);
    }

    #[test]
    fn test_unknown_names_stay_unresolved() {
        let unit = unit("trace(x);");
        let ExprKind::Call { callee, .. } = &expr_stmt(&unit.body[0]).kind else {
            panic!("expected call");
        };
        let ExprKind::Identifier(ident) = &callee.kind else {
            panic!("expected identifier");
        };
        assert_eq!(ident.binding, Binding::Unresolved);
    }
}
