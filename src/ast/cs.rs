//! Target statement model: C#-style statement and expression forms.
//!
//! Nodes are produced fresh during lowering and never mutated after
//! emission; they carry no ids or spans. The tree is handed to the
//! pretty-printing collaborator as-is.

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `int a = 0, b;` — `ty == None` emits `var`.
    LocalDecl {
        ty: Option<Type>,
        is_const: bool,
        declarators: Vec<Declarator>,
    },
    Expr(Expr),
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    For {
        init: ForInit,
        condition: Expr,
        update: Expr,
        body: Vec<Stmt>,
    },
    Foreach {
        ty: Option<Type>,
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        discriminant: Expr,
        sections: Vec<SwitchSection>,
        default: Option<Vec<Stmt>>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    YieldReturn(Expr),
    YieldBreak,
    Throw(Option<Expr>),
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Lock {
        object: Expr,
        body: Vec<Stmt>,
    },
    /// A label definition followed by an empty statement (`name: ;`).
    Labeled(String),
    Goto(String),
    /// Explicit scoping block.
    Block(Vec<Stmt>),
    /// Calling-convention-annotated extern stub; a binding contract only.
    ExternFunction(ExternFunction),
    /// Placeholder for a construct with no defined lowering; always paired
    /// with a diagnostic.
    Unsupported { note: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Decl {
        ty: Option<Type>,
        var: String,
        value: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSection {
    pub labels: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub ty: Option<Type>,
    pub var: Option<String>,
    /// Native exception filter (`when (...)`).
    pub filter: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternFunction {
    pub library: String,
    pub entry_point: Option<String>,
    pub char_set: Option<CharSet>,
    pub name: String,
    pub params: Vec<ExternParam>,
    pub return_type: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternParam {
    pub name: String,
    pub ty: Type,
    pub by_ref: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet {
    Ansi,
    Unicode,
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Named(String),
    Array { elem: Box<Type>, rank: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    StringLit(String),
    CharLit(char),
    Null,
    /// `default(T)`.
    Default(Type),
    Ident(String),
    Member {
        object: Box<Expr>,
        name: String,
        conditional: bool,
    },
    Index {
        object: Box<Expr>,
        args: Vec<Expr>,
    },
    Invoke {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        ty: Type,
        args: Vec<Expr>,
    },
    /// `new T[e0, e1]` — allocation by extent.
    NewArray {
        elem: Type,
        extents: Vec<Expr>,
    },
    /// `new[] { ... }` / `new T[] { ... }` — allocation by initializer.
    NewArrayInit {
        elem: Option<Type>,
        values: Vec<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// `i++`.
    Increment(Box<Expr>),
    /// `e is T`.
    Is {
        operand: Box<Expr>,
        ty: Type,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Short-circuit `&&`.
    AndAlso,
    /// Short-circuit `||`.
    OrElse,
    /// Non-short-circuit `&`.
    BitAnd,
    /// Non-short-circuit `|`.
    BitOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::IntLit(value)
    }

    /// `object.name`.
    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member { object: Box::new(object), name: name.into(), conditional: false }
    }

    /// `Receiver.Method(args)` for well-known static helpers like
    /// `Array.Copy` and `Math.Min`.
    pub fn invoke_static(receiver: &str, method: &str, args: Vec<Expr>) -> Self {
        Expr::Invoke {
            callee: Box::new(Self::member(Self::ident(receiver), method)),
            args,
        }
    }

    pub fn invoke(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Invoke { callee: Box::new(callee), args }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            op: AssignOp::Assign,
            value: Box::new(value),
        }
    }

    /// `target != null`.
    pub fn not_null(target: Expr) -> Self {
        Self::binary(BinOp::Ne, target, Expr::Null)
    }
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn array(elem: Type, rank: u32) -> Self {
        Type::Array { elem: Box::new(elem), rank }
    }
}
