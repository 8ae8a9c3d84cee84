//! Abstract syntax tree definitions.
//!
//! Every node carries the [`Span`] it was parsed from. Nodes are plain data: the parser
//! builds them once and nothing mutates them afterwards.

use nasin_source::Span;
use serde::Serialize;

/// The root of a parse: one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub span: Span,
    pub name: String,
    pub path: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    /// A function declaration (e.g. `add(a, b) = a + b`).
    Func(FuncDecl),
    /// A module level binding (e.g. `answer: Int = 42`).
    Global(VarDecl),
    /// A block local binding (e.g. `let x = 1` or `x = 1`).
    Let(VarDecl),
    /// A type declaration (e.g. `type Point { x: Int, y: Int }`).
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_type: Option<TypeExpr>,
    pub directives: Vec<Directive>,
    /// `None` for declarations without a body, typically annotated with a directive
    /// (e.g. `puts(s: Str): Int @extern("c", puts)`).
    pub body: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub span: Span,
    pub pat: Pat,
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub pat: Pat,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub fields: Vec<RecordField>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub span: Span,
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub span: Span,
    pub func: FuncDecl,
}

/// An annotation attached to a function declaration (e.g. `@extern("c", puts)`).
/// Directives are kept as data; nothing in the front-end interprets them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub span: Span,
    pub name: String,
    pub args: Vec<DirectiveArg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveArg {
    pub span: Span,
    pub kind: DirectiveArgKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirectiveArgKind {
    Bool(bool),
    Ident(String),
    Num(String),
    Str(String),
    Array(Vec<DirectiveArg>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    /// A number literal, kept as written (e.g. `1_000`, `0xff`, `2.5`).
    Num(String),
    Bool(bool),
    /// A string literal. Escape sequences are left untouched.
    Str(String),
    /// An identifier (e.g. `foo`).
    Ident(String),
    /// A property access (e.g. `point.x`).
    GetProp { parent: Box<Expr>, name: String },
    /// An array literal (e.g. `[1, 2, 3]`).
    Array(Vec<Expr>),
    /// A record literal (e.g. `{x = 1, y = 2}`).
    Record(Vec<RecordLitField>),
    /// A function call (e.g. `foo(1, bar)`).
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// A macro invocation (e.g. `@print("hi")`).
    Macro { name: String, args: Vec<Expr> },
    /// A unary expression (e.g. `-x`, `not done`).
    Unary { op: UnOp, operand: Box<Expr> },
    /// A binary expression (e.g. `1 + 1`).
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A function literal (e.g. `fn(x) = x * 2`).
    Lambda { params: Vec<Param>, body: Box<Expr> },
    /// Local statements followed by the value of the block.
    Block { body: Vec<Stmt>, value: Box<Expr> },
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordLitField {
    pub span: Span,
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl BinOp {
    /// Returns the `(left, right)` binding power of the operator.
    /// Left associative operators bind their right side tighter, `**` is right associative.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            BinOp::Eq | BinOp::NotEq | BinOp::Gt | BinOp::Lt | BinOp::GtEq | BinOp::LtEq => {
                (2, 3)
            }
            BinOp::Add | BinOp::Sub => (4, 5),
            BinOp::Mul | BinOp::Div | BinOp::Mod => (6, 7),
            BinOp::Pow => (9, 8),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::GtEq => ">=",
            BinOp::LtEq => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    /// Binding power of the operand of a prefix operator.
    /// Tighter than `**`, so `-a ** 2` is `(-a) ** 2`.
    pub const BINDING_POWER: u8 = 10;

    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "not",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeExprKind {
    /// A simple named type (e.g. `Int`).
    Named(String),
    /// An array type, with an optional fixed length (e.g. `[Int; 3]`).
    Array {
        item: Box<TypeExpr>,
        len: Option<String>,
    },
    /// A parameterized type (e.g. `Map(Str, Int)`).
    Generic { name: String, args: Vec<TypeExpr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pat {
    pub span: Span,
    pub kind: PatKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatKind {
    Name(String),
}

impl Pat {
    /// The name bound by this pattern.
    pub fn name(&self) -> &str {
        match &self.kind {
            PatKind::Name(name) => name,
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { span, kind }
    }

    /// Returns `true` if the expression is a single token or is closed by a delimiter,
    /// so it can be used as an operand without parentheses.
    pub fn is_atomic(&self) -> bool {
        !matches!(
            self.kind,
            ExprKind::Unary { .. }
                | ExprKind::Binary { .. }
                | ExprKind::Lambda { .. }
                | ExprKind::Block { .. }
                | ExprKind::If { .. }
        )
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { span, kind }
    }
}
