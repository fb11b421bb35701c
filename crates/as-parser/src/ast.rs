//! Syntax tree for ActionScript compilation units.
//!
//! Every node owns its children and carries a [`SourceLocation`]. Nodes that
//! the emitter refers back to (expressions, statements, declarators, class
//! members) also carry a [`NodeId`] unique within their unit.

use crate::types::{StaticType, TypeAnnotation};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use source_map::SourceLocation;

/// Identity of a node within one compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A parsed and resolved source file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Path the unit was read from; shared by every location in the tree.
    pub path: SmolStr,
    pub package: Option<PackageDecl>,
    pub body: Vec<Stmt>,
    /// Initializers of compile-time constants, keyed by the declaring node.
    pub constants: FxHashMap<NodeId, Expr>,
    pub loc: SourceLocation,
}

impl CompilationUnit {
    /// File name without directories or extension.
    pub fn stem(&self) -> &str {
        let path = self.path.as_str();
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        name.split('.').next().unwrap_or(name)
    }

    /// Classes declared anywhere at the top level of the unit.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::Class(class) => Some(class.as_ref()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    /// Dotted package name, empty for the default package.
    pub name: SmolStr,
    pub loc: SourceLocation,
}

// ============================================================================
// Identifiers
// ============================================================================

/// What an identifier refers to, as decided by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    /// Global, imported or otherwise unknown.
    #[default]
    Unresolved,
    /// Local variable, parameter or top-level variable of the unit.
    Local {
        ty: StaticType,
        /// Declarator holding the initializer when this is a constant.
        constant: Option<NodeId>,
    },
    /// Member of an enclosing class referenced without a qualifier.
    Member(MemberRef),
    /// A class declared in this unit.
    Class { qualified_name: SmolStr },
}

impl Binding {
    pub fn static_type(&self) -> StaticType {
        match self {
            Binding::Local { ty, .. } => ty.clone(),
            Binding::Member(member) => member.ty.clone(),
            Binding::Class { .. } | Binding::Unresolved => StaticType::Any,
        }
    }

    pub fn constant(&self) -> Option<NodeId> {
        match self {
            Binding::Local { constant, .. } => *constant,
            Binding::Member(member) => member.constant,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Qualified name of the declaring class.
    pub class: SmolStr,
    pub is_static: bool,
    pub visibility: Visibility,
    pub ty: StaticType,
    pub constant: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: SmolStr,
    pub loc: SourceLocation,
    pub binding: Binding,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(Identifier),
    Literal(Literal),
    This,
    Super,
    /// `left op right`; `right` is missing when the source was cut short.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Option<Box<Expr>>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        consequent: Option<Box<Expr>>,
        alternate: Option<Box<Expr>>,
    },
    Member {
        object: Box<Expr>,
        property: Identifier,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Paren(Box<Expr>),
    Object(Vec<Property>),
    Array(Vec<Expr>),
    Function(Box<Function>),
    /// E4X `a..b`.
    Descendants {
        object: Box<Expr>,
        name: Identifier,
    },
}

impl ExprKind {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Identifier(_) => "identifier",
            ExprKind::Literal(_) => "literal",
            ExprKind::This => "this",
            ExprKind::Super => "super",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Postfix { .. } => "postfix expression",
            ExprKind::Ternary { .. } => "conditional expression",
            ExprKind::Member { .. } => "member access",
            ExprKind::Index { .. } => "dynamic access",
            ExprKind::Call { .. } => "call",
            ExprKind::New { .. } => "new expression",
            ExprKind::Paren(_) => "parenthesized expression",
            ExprKind::Object(_) => "object literal",
            ExprKind::Array(_) => "array literal",
            ExprKind::Function(_) => "function expression",
            ExprKind::Descendants { .. } => "E4X descendants",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal as written.
    Number(SmolStr),
    /// String literal as written, quotes included.
    String(SmolStr),
    Boolean(bool),
    Null,
    Undefined,
}

impl Literal {
    pub fn text(&self) -> &str {
        match self {
            Literal::Number(raw) | Literal::String(raw) => raw,
            Literal::Boolean(true) => "true",
            Literal::Boolean(false) => "false",
            Literal::Null => "null",
            Literal::Undefined => "undefined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Comma,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    In,
    Instanceof,
    Is,
    As,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Comma => ",",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::Instanceof => "instanceof",
            BinaryOp::Is => "is",
            BinaryOp::As => "as",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    /// Binding power for precedence climbing; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Comma => 1,
            BinaryOp::Or => 4,
            BinaryOp::And => 5,
            BinaryOp::BitOr => 6,
            BinaryOp::BitXor => 7,
            BinaryOp::BitAnd => 8,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 9,
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::Instanceof
            | BinaryOp::Is
            | BinaryOp::As => 10,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 11,
            BinaryOp::Add | BinaryOp::Sub => 12,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 13,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    /// `&&=`
    And,
    /// `||=`
    Or,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::And => "&&=",
            AssignOp::Or => "||=",
        }
    }

    /// The logical operator a compound logical assignment expands to.
    pub fn logical_operator(self) -> Option<BinaryOp> {
        match self {
            AssignOp::And => Some(BinaryOp::And),
            AssignOp::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitNot,
    Neg,
    Plus,
    Increment,
    Decrement,
    Delete,
    Typeof,
    Void,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
            UnaryOp::Delete => "delete",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

/// A `key: value` pair of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyKey {
    /// Key text as written (identifier, quoted string or number).
    pub text: SmolStr,
    pub loc: SourceLocation,
}

/// A function body with its signature. Used for declarations, methods and
/// function expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<Identifier>,
    pub params: Vec<Param>,
    /// From `(` through `)`.
    pub params_loc: SourceLocation,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub default: Option<Expr>,
    /// `...rest`
    pub rest: bool,
    pub loc: SourceLocation,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    /// Statement range, without a trailing `;`.
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Var(VarDecl),
    Block(Block),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<ElseClause>,
    },
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        while_keyword: SourceLocation,
        condition: Expr,
    },
    Switch {
        discriminant: Expr,
        open_brace: SourceLocation,
        cases: Vec<SwitchCase>,
    },
    Try(Box<TryStmt>),
    Return(Option<Expr>),
    /// `throw` always has a value in valid source.
    Throw(Option<Expr>),
    Break(Option<Identifier>),
    Continue(Option<Identifier>),
    With {
        object: Expr,
        body: Box<Stmt>,
    },
    Labeled {
        label: Identifier,
        body: Box<Stmt>,
    },
    Function(Box<Function>),
    Class(Box<ClassDecl>),
    Import(ImportDecl),
    UseNamespace(Identifier),
    Empty,
}

impl StmtKind {
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Expr(_) => "expression statement",
            StmtKind::Var(_) => "variable declaration",
            StmtKind::Block(_) => "block",
            StmtKind::If { .. } => "if statement",
            StmtKind::For(_) => "for loop",
            StmtKind::ForIn(f) if f.each => "for each loop",
            StmtKind::ForIn(_) => "for-in loop",
            StmtKind::While { .. } => "while loop",
            StmtKind::DoWhile { .. } => "do-while loop",
            StmtKind::Switch { .. } => "switch statement",
            StmtKind::Try(_) => "try statement",
            StmtKind::Return(_) => "return statement",
            StmtKind::Throw(_) => "throw statement",
            StmtKind::Break(_) => "break statement",
            StmtKind::Continue(_) => "continue statement",
            StmtKind::With { .. } => "with statement",
            StmtKind::Labeled { .. } => "labeled statement",
            StmtKind::Function(_) => "function declaration",
            StmtKind::Class(_) => "class declaration",
            StmtKind::Import(_) => "import",
            StmtKind::UseNamespace(_) => "use namespace",
            StmtKind::Empty => "empty statement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// From `{` through `}`.
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
    /// From the keyword through the last declarator.
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub id: NodeId,
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub init: Option<Expr>,
    pub loc: SourceLocation,
}

impl Declarator {
    pub fn static_type(&self) -> StaticType {
        self.ty.as_ref().map_or(StaticType::Any, |t| t.ty.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    pub keyword: SourceLocation,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
    pub first_semi: SourceLocation,
    pub second_semi: SourceLocation,
    pub close_paren: SourceLocation,
    pub body: Stmt,
}

/// `for (x in o)` and `for each (x in o)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub each: bool,
    pub binding: ForBinding,
    pub target: Expr,
    pub close_paren: SourceLocation,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForBinding {
    /// `var x:T` declared in the loop head; exactly one declarator.
    Var(VarDecl),
    /// An existing variable.
    Expr(Expr),
}

impl ForBinding {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            ForBinding::Var(decl) => &decl.loc,
            ForBinding::Expr(expr) => &expr.loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<FinallyClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub keyword: SourceLocation,
    pub param: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub close_paren: SourceLocation,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinallyClause {
    pub keyword: SourceLocation,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Dotted name, possibly ending in `*`.
    pub name: SmolStr,
    pub loc: SourceLocation,
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    #[default]
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_dynamic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Identifier,
    /// Package-qualified name, e.g. `a.b.Widget`.
    pub qualified_name: SmolStr,
    pub modifiers: Modifiers,
    pub extends: Option<Identifier>,
    pub implements: Vec<Identifier>,
    pub members: Vec<ClassMember>,
    pub loc: SourceLocation,
}

impl ClassDecl {
    pub fn constructor(&self) -> Option<&Function> {
        self.members.iter().find_map(|m| match &m.kind {
            MemberKind::Constructor(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub id: NodeId,
    pub modifiers: Modifiers,
    pub kind: MemberKind,
    /// Member range without a trailing `;`.
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Field(Field),
    Method(Function),
    Constructor(Function),
    Getter(Function),
    Setter(Function),
}

/// One declared field; `var a, b` in a class body becomes two fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: VarKind,
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub init: Option<Expr>,
}

impl Field {
    pub fn static_type(&self) -> StaticType {
        self.ty.as_ref().map_or(StaticType::Any, |t| t.ty.clone())
    }
}
