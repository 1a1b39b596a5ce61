//! Source statement model: a closed set of VB-style statement and expression
//! forms, produced by the parser collaborator and consumed read-only here.
//!
//! Every statement and expression carries a [`NodeId`] because the semantic
//! fact bundle is keyed by node identity, plus a [`Span`] for diagnostics.

use crate::span::{NodeId, Span, Spanned};

/// One compilation unit: an ordered list of members to lower.
#[derive(Debug, Clone)]
pub struct Unit {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Procedure(Procedure),
    /// `Declare Function/Sub ... Lib "..."` external-procedure declaration.
    ExternDecl(DeclareDecl),
}

/// A procedure body is the granularity of lowering: the context stack and
/// label table live for exactly one of these.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    /// Iterator procedures turn `Yield` into yield-return and a bare
    /// `Return` into yield-break.
    pub is_iterator: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Option<TypeSyntax>,
    pub by_ref: bool,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `Dim a, b As Integer = 0, c(5) As String` — one statement, many
    /// declarators.
    Local {
        declarators: Vec<Declarator>,
        is_const: bool,
    },
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    /// Call statements and bare invocations.
    ExprStmt(Expr),
    /// Multi-line and single-line `If`; `branches[0]` is the `If` arm, the
    /// rest are `ElseIf` arms.
    If {
        branches: Vec<IfBranch>,
        else_body: Option<Vec<Stmt>>,
    },
    Select {
        discriminant: Expr,
        sections: Vec<CaseSection>,
        else_section: Option<Vec<Stmt>>,
    },
    /// `For v = from To to [Step s] ... Next` — inclusive upper bound,
    /// evaluated once before iteration starts.
    ForNext {
        control: ForControl,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    ForEach {
        control: ForControl,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    /// All four `Do ... Loop` shapes plus the unconditional one.
    DoLoop {
        condition: Option<LoopCondition>,
        body: Vec<Stmt>,
    },
    /// Implicit-receiver block: `With expr ... End With`.
    With {
        receiver: Expr,
        body: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchSection>,
        finally: Option<Vec<Stmt>>,
    },
    /// `Throw e` or a bare rethrow.
    Throw(Option<Expr>),
    Label(Spanned<String>),
    Goto(Spanned<String>),
    /// `ReDim [Preserve] a(bounds), b(bounds)`.
    Redim {
        preserve: bool,
        targets: Vec<RedimTarget>,
    },
    /// `Erase a, b` — release to the empty/null state.
    Erase {
        targets: Vec<Expr>,
    },
    Yield(Expr),
    Return(Option<Expr>),
    /// `SyncLock obj ... End SyncLock`.
    SyncLock {
        object: Expr,
        body: Vec<Stmt>,
    },
    AddHandler {
        event: Expr,
        handler: Expr,
    },
    RemoveHandler {
        event: Expr,
        handler: Expr,
    },
    Exit(ExitKind),
    Continue(ContinueKind),
    /// `End` — terminate the program.
    End,
    /// `Stop` — break into the debugger.
    Stop,
    /// External-procedure declaration in statement position; also appears
    /// as a standalone [`Member`].
    ExternDecl(DeclareDecl),
}

#[derive(Debug, Clone)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// One declared name inside a `Dim`/`Const` statement.
#[derive(Debug, Clone)]
pub struct Declarator {
    /// Identity used to resolve the declared type through the facts
    /// provider.
    pub id: NodeId,
    pub name: Spanned<String>,
    /// Inline array bounds: `Dim a(0 To n - 1, 5)`. Inclusive upper bounds.
    pub array_bounds: Option<Vec<Expr>>,
    pub ty: Option<TypeSyntax>,
    pub init: Option<Expr>,
}

/// One resize target inside a `ReDim` statement.
#[derive(Debug, Clone)]
pub struct RedimTarget {
    pub id: NodeId,
    pub span: Span,
    pub target: Expr,
    /// Inclusive upper bound per dimension.
    pub bounds: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub enum LoopCondition {
    PreWhile(Expr),
    PreUntil(Expr),
    PostWhile(Expr),
    PostUntil(Expr),
}

/// Loop-control variable of a `For`/`For Each` header. `declares` is true
/// when the header introduces a fresh variable rather than assigning an
/// existing symbol (`For Me.Index = 0 To 10`).
#[derive(Debug, Clone)]
pub struct ForControl {
    pub id: NodeId,
    pub target: Expr,
    pub declares: bool,
    pub ty: Option<TypeSyntax>,
}

#[derive(Debug, Clone)]
pub struct CaseSection {
    pub clauses: Vec<CaseClause>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum CaseClause {
    /// `Case 5`, `Case UCase("a")` — equality against the discriminant.
    Value(Expr),
    /// `Case lo To hi` — inclusive range.
    Range { from: Expr, to: Expr },
    /// `Case Is >= 5` — relational against the discriminant.
    Relational { op: RelationalOp, operand: Expr },
    /// Type test against the discriminant's runtime type.
    TypeIs(TypeSyntax),
    /// Arbitrary boolean guard (`Select Case True` idiom).
    Guard(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    Ne,
}

#[derive(Debug, Clone)]
pub struct CatchSection {
    /// Identity used to resolve the declared exception type.
    pub id: NodeId,
    pub var: Option<Spanned<String>>,
    pub ty: Option<TypeSyntax>,
    /// `When` guard; lowers to a native exception filter.
    pub filter: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    For,
    While,
    Do,
    Select,
    /// `Exit Sub` / `Exit Function`.
    Procedure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueKind {
    For,
    While,
    Do,
}

/// External-procedure declaration: a binding contract only, no body.
#[derive(Debug, Clone)]
pub struct DeclareDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Spanned<String>,
    pub library: String,
    pub alias: Option<String>,
    pub char_set: Option<CharSet>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeSyntax>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet {
    Ansi,
    Unicode,
    Auto,
}

/// Source type syntax as written, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSyntax {
    Named(String),
    Array { elem: Box<TypeSyntax>, rank: u32 },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    StringLit(String),
    CharLit(char),
    /// The null/empty reference literal.
    Nothing,
    Ident(String),
    /// Member access. `receiver == None` is implicit-receiver shorthand
    /// (`.Name` inside a `With` block); `conditional` preserves `?.`.
    Member {
        receiver: Option<Box<Expr>>,
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
        ty: TypeSyntax,
        args: Vec<Expr>,
    },
    /// `{1, 2, 3}` collection initializer.
    ArrayLit(Vec<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `TypeOf e Is T`.
    TypeOfIs {
        operand: Box<Expr>,
        ty: TypeSyntax,
    },
    /// `AddressOf handler` — a method-group reference.
    AddressOf(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Integer division `\`.
    IntDiv,
    Mod,
    /// String concatenation `&`.
    Concat,
    Eq,
    Ne,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Non-short-circuit boolean/bitwise `And`.
    And,
    /// Non-short-circuit boolean/bitwise `Or`.
    Or,
    AndAlso,
    OrElse,
    /// Reference equality `Is`.
    Is,
    IsNot,
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
    Concat,
}

impl Expr {
    /// Whether this expression is a literal constant or a bare identifier —
    /// the forms a loop bound may inline without a hoisted temporary.
    pub fn is_literal_or_ident(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::IntLit(_)
                | ExprKind::FloatLit(_)
                | ExprKind::BoolLit(_)
                | ExprKind::StringLit(_)
                | ExprKind::CharLit(_)
                | ExprKind::Nothing
                | ExprKind::Ident(_)
        )
    }

    /// Literal integer value, if this is an integer literal.
    pub fn as_int_literal(&self) -> Option<i64> {
        match self.kind {
            ExprKind::IntLit(v) => Some(v),
            _ => None,
        }
    }
}
