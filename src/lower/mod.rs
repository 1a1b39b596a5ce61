//! The statement lowering engine.
//!
//! One strict document-order traversal per procedure body, dispatching each
//! statement kind to its lowering and composing the emitted target
//! statements. All traversal state (temporary names, implicit-receiver
//! frames, breakable constructs, the label table) is threaded explicitly
//! and lives for exactly one procedure.
//!
//! Failure policy: node-local failures become a placeholder statement plus
//! a diagnostic so one bad construct never aborts a whole file;
//! unresolved-label and internal-invariant failures abort the enclosing
//! procedure only.

pub mod scope;
pub mod types;
pub mod expr;
pub mod loops;
pub mod arrays;
pub mod switch;
pub mod exceptions;
pub mod interop;

use crate::ast::cs;
use crate::ast::vb::{self, Member, Procedure, StmtKind, Unit};
use crate::diagnostics::{Diagnostic, TranslateError};
use crate::facts::{self, SemanticFacts, SymbolKind};
use crate::CancelToken;

use self::expr::lower_expr;
use self::scope::{Breakable, LabelTable, NameAllocator, WithStack};
use self::types::{lower_type_ref, lower_type_syntax};

/// Result of lowering one procedure body.
#[derive(Debug)]
pub struct Lowered {
    pub stmts: Vec<cs::Stmt>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of lowering a compilation unit.
#[derive(Debug)]
pub struct UnitLowered {
    pub members: Vec<LoweredMember>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub enum LoweredMember {
    Procedure { name: String, body: Vec<cs::Stmt> },
    Extern(cs::ExternFunction),
}

/// Lower one procedure body. Returns `Err` only for procedure-fatal
/// failures (unresolved labels, internal invariant violations); everything
/// node-local is reported through the diagnostics list.
pub fn lower_procedure(
    proc: &Procedure,
    facts: &dyn SemanticFacts,
) -> Result<Lowered, TranslateError> {
    // Pre-pass: every label in the body is known before any statement is
    // lowered, so forward jumps resolve.
    let labels = LabelTable::collect(&proc.body);
    let names = NameAllocator::for_procedure(proc);

    let mut lw = Lowerer {
        facts,
        names,
        withs: WithStack::default(),
        breakables: Vec::new(),
        labels,
        diagnostics: Vec::new(),
        proc_body: &proc.body,
        is_iterator: proc.is_iterator,
    };
    let stmts = lw.lower_block(&proc.body)?;
    Ok(Lowered { stmts, diagnostics: lw.diagnostics })
}

/// Lower a whole unit. A procedure that fails fatally contributes its error
/// as a diagnostic and no member — a partially-lowered body is never
/// surfaced. Cancellation is honored between members.
pub fn lower_unit(
    unit: &Unit,
    facts: &dyn SemanticFacts,
    cancel: Option<&CancelToken>,
) -> Result<UnitLowered, TranslateError> {
    let mut members = Vec::with_capacity(unit.members.len());
    let mut diagnostics = Vec::new();

    for member in &unit.members {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(TranslateError::Cancelled);
        }
        match member {
            Member::Procedure(proc) => match lower_procedure(proc, facts) {
                Ok(lowered) => {
                    diagnostics.extend(lowered.diagnostics);
                    members.push(LoweredMember::Procedure {
                        name: proc.name.node.clone(),
                        body: lowered.stmts,
                    });
                }
                Err(err) => diagnostics.push(Diagnostic::from_error(&err)),
            },
            Member::ExternDecl(decl) => match interop::lower_declare(decl, facts) {
                Ok(stub) => members.push(LoweredMember::Extern(stub)),
                Err(err) => diagnostics.push(Diagnostic::from_error(&err)),
            },
        }
    }
    Ok(UnitLowered { members, diagnostics })
}

/// Traversal state for one procedure body.
pub(crate) struct Lowerer<'a> {
    pub(crate) facts: &'a dyn SemanticFacts,
    pub(crate) names: NameAllocator,
    pub(crate) withs: WithStack,
    pub(crate) breakables: Vec<Breakable>,
    pub(crate) labels: LabelTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Top-level statements of the procedure, for the
    /// definite-assignment-before-read scan.
    proc_body: &'a [vb::Stmt],
    pub(crate) is_iterator: bool,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_block(
        &mut self,
        stmts: &[vb::Stmt],
    ) -> Result<Vec<cs::Stmt>, TranslateError> {
        let mut out = Vec::new();
        for stmt in stmts {
            match self.lower_stmt(stmt) {
                Ok(lowered) => out.extend(lowered),
                Err(err) if err.is_procedure_fatal() => return Err(err),
                Err(err) => {
                    self.diagnostics.push(Diagnostic::from_error(&err));
                    out.push(cs::Stmt::Unsupported { note: err.to_string() });
                }
            }
        }
        Ok(out)
    }

    fn lower_stmt(&mut self, stmt: &vb::Stmt) -> Result<Vec<cs::Stmt>, TranslateError> {
        match &stmt.kind {
            StmtKind::Local { declarators, is_const } => {
                self.lower_local(stmt, declarators, *is_const)
            }
            StmtKind::Assign { target, op, value } => {
                let target = lower_expr(self, target)?;
                let value = lower_expr(self, value)?;
                let op = match op {
                    vb::AssignOp::Assign => cs::AssignOp::Assign,
                    vb::AssignOp::Add | vb::AssignOp::Concat => cs::AssignOp::Add,
                    vb::AssignOp::Sub => cs::AssignOp::Sub,
                    vb::AssignOp::Mul => cs::AssignOp::Mul,
                    vb::AssignOp::Div => cs::AssignOp::Div,
                };
                Ok(vec![cs::Stmt::Expr(cs::Expr::Assign {
                    target: Box::new(target),
                    op,
                    value: Box::new(value),
                })])
            }
            StmtKind::ExprStmt(e) => Ok(vec![cs::Stmt::Expr(lower_expr(self, e)?)]),
            StmtKind::If { branches, else_body } => {
                switch::lower_if(self, branches, else_body.as_deref())
            }
            StmtKind::Select { discriminant, sections, else_section } => {
                switch::lower_select(self, stmt, discriminant, sections, else_section.as_deref())
            }
            StmtKind::ForNext { control, from, to, step, body } => {
                loops::lower_for_next(self, stmt, control, from, to, step.as_ref(), body)
            }
            StmtKind::ForEach { control, iterable, body } => {
                loops::lower_for_each(self, stmt, control, iterable, body)
            }
            StmtKind::While { condition, body } => loops::lower_while(self, condition, body),
            StmtKind::DoLoop { condition, body } => {
                loops::lower_do_loop(self, condition.as_ref(), body)
            }
            StmtKind::With { receiver, body } => self.lower_with(receiver, body),
            StmtKind::Try { body, catches, finally } => {
                exceptions::lower_try(self, stmt, body, catches, finally.as_deref())
            }
            StmtKind::Throw(value) => exceptions::lower_throw(self, value.as_ref()),
            StmtKind::Label(name) => Ok(vec![cs::Stmt::Labeled(name.node.clone())]),
            StmtKind::Goto(name) => match self.labels.resolve(&name.node) {
                Some(canonical) => Ok(vec![cs::Stmt::Goto(canonical.to_string())]),
                None => Err(TranslateError::ambiguous_label(&name.node, stmt.id, stmt.span)),
            },
            StmtKind::Redim { preserve, targets } => arrays::lower_redim(self, *preserve, targets),
            StmtKind::Erase { targets } => arrays::lower_erase(self, targets),
            StmtKind::Yield(value) => {
                Ok(vec![cs::Stmt::YieldReturn(lower_expr(self, value)?)])
            }
            StmtKind::Return(value) => match value {
                Some(value) => Ok(vec![cs::Stmt::Return(Some(lower_expr(self, value)?))]),
                // A bare return inside an iterator ends the sequence.
                None if self.is_iterator => Ok(vec![cs::Stmt::YieldBreak]),
                None => Ok(vec![cs::Stmt::Return(None)]),
            },
            StmtKind::SyncLock { object, body } => {
                let object = lower_expr(self, object)?;
                let body = self.lower_block(body)?;
                Ok(vec![cs::Stmt::Lock { object, body }])
            }
            StmtKind::AddHandler { event, handler } => {
                self.lower_handler(event, handler, cs::AssignOp::Add)
            }
            StmtKind::RemoveHandler { event, handler } => {
                self.lower_handler(event, handler, cs::AssignOp::Sub)
            }
            StmtKind::Exit(kind) => loops::lower_exit(self, stmt, *kind),
            StmtKind::Continue(kind) => loops::lower_continue(self, stmt, *kind),
            StmtKind::End => Ok(vec![cs::Stmt::Expr(cs::Expr::invoke_static(
                "Environment",
                "Exit",
                vec![cs::Expr::int(0)],
            ))]),
            StmtKind::Stop => Ok(vec![cs::Stmt::Expr(cs::Expr::invoke_static(
                "Debugger",
                "Break",
                vec![],
            ))]),
            StmtKind::ExternDecl(decl) => Ok(vec![cs::Stmt::ExternFunction(
                interop::lower_declare(decl, self.facts)?,
            )]),
        }
    }

    /// `Dim`/`Const` statements: one target declaration per declarator.
    /// Declarators with inline array bounds allocate; declarators without
    /// an initializer get a `default(T)` one unless the variable is
    /// definitely assigned before it is read.
    fn lower_local(
        &mut self,
        stmt: &vb::Stmt,
        declarators: &[vb::Declarator],
        is_const: bool,
    ) -> Result<Vec<cs::Stmt>, TranslateError> {
        let mut out = Vec::new();
        for d in declarators {
            if let Some(bounds) = &d.array_bounds {
                let elem = match &d.ty {
                    Some(t) => lower_type_syntax(t, d.id, stmt.span, self.facts)?,
                    None => self.resolved_array_elem(d, stmt)?,
                };
                let rank = bounds.len() as u32;
                let init = arrays::alloc_from_bounds(self, elem.clone(), bounds)?;
                out.push(cs::Stmt::LocalDecl {
                    ty: Some(cs::Type::array(elem, rank)),
                    is_const,
                    declarators: vec![cs::Declarator {
                        name: d.name.node.clone(),
                        init: Some(init),
                    }],
                });
                continue;
            }

            let (ty, init) = match (&d.ty, &d.init) {
                (None, Some(init)) => (None, Some(lower_expr(self, init)?)),
                (Some(t), Some(init)) => {
                    let ty = lower_type_syntax(t, d.id, stmt.span, self.facts)?;
                    (Some(ty), Some(lower_expr(self, init)?))
                }
                (declared, None) => {
                    let ty = match declared {
                        Some(t) => lower_type_syntax(t, d.id, stmt.span, self.facts)?,
                        None => {
                            let resolved = self.facts.resolve_type(d.id).ok_or_else(|| {
                                TranslateError::missing_fact(
                                    format!("resolve_type({})", d.name.node),
                                    d.id,
                                    stmt.span,
                                )
                            })?;
                            lower_type_ref(&resolved, d.id, self.facts)
                        }
                    };
                    let init = if is_const || self.definitely_assigned(&d.name.node) {
                        None
                    } else {
                        // Conservative: a redundant default initializer is
                        // always safe, a missing one never is.
                        Some(cs::Expr::Default(ty.clone()))
                    };
                    (Some(ty), init)
                }
            };
            out.push(cs::Stmt::LocalDecl {
                ty,
                is_const,
                declarators: vec![cs::Declarator { name: d.name.node.clone(), init }],
            });
        }
        Ok(out)
    }

    fn resolved_array_elem(
        &mut self,
        d: &vb::Declarator,
        stmt: &vb::Stmt,
    ) -> Result<cs::Type, TranslateError> {
        let resolved = self.facts.resolve_type(d.id).ok_or_else(|| {
            TranslateError::missing_fact(format!("resolve_type({})", d.name.node), d.id, stmt.span)
        })?;
        match resolved.element() {
            Some((elem, _)) => Ok(lower_type_ref(elem, d.id, self.facts)),
            None => Err(TranslateError::unsupported(
                format!("'{}' declares array bounds but is not array-typed", d.name.node),
                d.id,
                stmt.span,
            )),
        }
    }

    fn definitely_assigned(&self, name: &str) -> bool {
        facts::is_definitely_assigned_before_read(name, self.proc_body, self.facts)
    }

    /// Implicit-receiver block. A side-effect-free simple reference is
    /// reused as the frame receiver; anything else is captured once in a
    /// `withBlock` temporary so the receiver is evaluated exactly once no
    /// matter how many member accesses route through it.
    fn lower_with(
        &mut self,
        receiver: &vb::Expr,
        body: &[vb::Stmt],
    ) -> Result<Vec<cs::Stmt>, TranslateError> {
        let receiver_cs = lower_expr(self, receiver)?;

        let simple = matches!(receiver.kind, vb::ExprKind::Ident(_))
            && self
                .facts
                .symbol_kind_of(receiver.id)
                .is_some_and(SymbolKind::is_side_effect_free);

        if simple {
            self.withs.push(receiver_cs);
            let body_cs = self.lower_block(body);
            self.withs.pop();
            return body_cs;
        }

        let temp = self.names.fresh("withBlock");
        let decl = cs::Stmt::LocalDecl {
            ty: None,
            is_const: false,
            declarators: vec![cs::Declarator { name: temp.clone(), init: Some(receiver_cs) }],
        };
        self.withs.push(cs::Expr::ident(temp));
        let body_cs = self.lower_block(body);
        self.withs.pop();

        let mut block = vec![decl];
        block.extend(body_cs?);
        Ok(vec![cs::Stmt::Block(block)])
    }

    fn lower_handler(
        &mut self,
        event: &vb::Expr,
        handler: &vb::Expr,
        op: cs::AssignOp,
    ) -> Result<Vec<cs::Stmt>, TranslateError> {
        let event = lower_expr(self, event)?;
        let handler = lower_expr(self, handler)?;
        Ok(vec![cs::Stmt::Expr(cs::Expr::Assign {
            target: Box::new(event),
            op,
            value: Box::new(handler),
        })])
    }
}
