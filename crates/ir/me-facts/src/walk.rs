//! Preorder traversal of a unit's statements
//!
//! Analyses that only react to assignments and returns consume the flat
//! stream produced by [`Statements`] instead of writing their own visitor.
//! Nested blocks, branches, loop bodies and function literal bodies are
//! entered in source order, each statement before its children.

use crate::syntax::{AssignStmt, Block, Expr, ExprKind, FuncDecl, ReturnStmt, SourceFile, Stmt, StmtKind};
use crate::unit::Unit;

/// A statement shape the tracking analyses react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedStmt<'a> {
    /// Assignment statement
    Assign(&'a AssignStmt),
    /// Return statement
    Return(&'a ReturnStmt),
}

/// Iterator over the assignment and return statements of a unit
pub struct Statements<'a> {
    files: std::slice::Iter<'a, SourceFile>,
    decls: std::slice::Iter<'a, FuncDecl>,
    stack: Vec<&'a Stmt>,
}

impl<'a> Statements<'a> {
    pub(crate) fn new(unit: &'a Unit) -> Self {
        Self {
            files: unit.files.iter(),
            decls: Default::default(),
            stack: Vec::new(),
        }
    }

    fn next_decl(&mut self) -> Option<&'a FuncDecl> {
        loop {
            if let Some(decl) = self.decls.next() {
                return Some(decl);
            }
            self.decls = self.files.next()?.decls.iter();
        }
    }

    fn push_block(&mut self, block: &'a Block) {
        self.stack.extend(block.stmts.iter().rev());
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = TrackedStmt<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(stmt) = self.stack.pop() {
                let mut children = Vec::new();
                collect_children(stmt, &mut children);
                self.stack.extend(children.into_iter().rev());

                match &stmt.kind {
                    StmtKind::Assign(assign) => return Some(TrackedStmt::Assign(assign)),
                    StmtKind::Return(ret) => return Some(TrackedStmt::Return(ret)),
                    _ => continue,
                }
            }

            let decl = self.next_decl()?;
            if let Some(body) = &decl.body {
                self.push_block(body);
            }
        }
    }
}

/// Direct child statements of `stmt`, in source order
fn collect_children<'a>(stmt: &'a Stmt, out: &mut Vec<&'a Stmt>) {
    match &stmt.kind {
        StmtKind::Assign(assign) => {
            for expr in assign.lhs.iter().chain(&assign.rhs) {
                closure_stmts(expr, out);
            }
        }
        StmtKind::Return(ret) => {
            for expr in &ret.results {
                closure_stmts(expr, out);
            }
        }
        StmtKind::Expr { expr } => closure_stmts(expr, out),
        StmtKind::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            out.extend(init.as_deref());
            closure_stmts(cond, out);
            out.extend(&then_branch.stmts);
            out.extend(else_branch.as_deref());
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            out.extend(init.as_deref());
            if let Some(cond) = cond {
                closure_stmts(cond, out);
            }
            out.extend(post.as_deref());
            out.extend(&body.stmts);
        }
        StmtKind::Block { block } => out.extend(&block.stmts),
        StmtKind::Other => {}
    }
}

/// Top-level statements of function literals inside `expr`
fn closure_stmts<'a>(expr: &'a Expr, out: &mut Vec<&'a Stmt>) {
    match &expr.kind {
        ExprKind::Call { callee, args } => {
            closure_stmts(callee, out);
            for arg in args {
                closure_stmts(arg, out);
            }
        }
        ExprKind::Selector { base, .. } => closure_stmts(base, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            closure_stmts(lhs, out);
            closure_stmts(rhs, out);
        }
        ExprKind::FuncLit { body } => out.extend(&body.stmts),
        ExprKind::Ident { .. } | ExprKind::Literal { .. } | ExprKind::Other => {}
    }
}
