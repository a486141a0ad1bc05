//! Pending error bindings
//!
//! The tracker sees assignments and returns in preorder and keeps, per
//! declaration site, the latest occurrence of an error value that no return
//! has taken out of the function yet. Occurrences that can no longer be
//! returned are escalated as soon as that is known.

use super::wrappers::WrapperRegistry;
use me_facts::{AssignStmt, DeclSite, ExprKind, IdentRes, ReturnStmt, TyId, Unit};
use me_span::FileSpan;
use rustc_hash::FxHashMap;

/// State left after the last statement
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    /// Latest unreturned occurrence per declaration site
    pub(crate) pending: FxHashMap<DeclSite, FileSpan>,
    /// Occurrences known to be lost, in discovery order
    pub(crate) escalated: Vec<FileSpan>,
}

pub(crate) struct Tracker<'a> {
    unit: &'a Unit,
    wrappers: &'a WrapperRegistry,
    pending: FxHashMap<DeclSite, FileSpan>,
    escalated: Vec<FileSpan>,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(unit: &'a Unit, wrappers: &'a WrapperRegistry) -> Self {
        Self {
            unit,
            wrappers,
            pending: FxHashMap::default(),
            escalated: Vec::new(),
        }
    }

    pub(crate) fn visit_assign(&mut self, assign: &AssignStmt) {
        for (index, target) in assign.lhs.iter().enumerate() {
            let Some(ident) = target.as_ident() else {
                continue;
            };

            match ident.res {
                IdentRes::Blank => {
                    if self.assigns_error(assign, index) {
                        self.escalate(ident.span);
                    }
                }
                IdentRes::Unresolved => {
                    if self.assigns_error(assign, index) {
                        self.escalate(ident.span);
                        break;
                    }
                }
                IdentRes::Def { object } => {
                    let Some(object) = self.unit.object(object) else {
                        continue;
                    };
                    if self.unit.implements_error(object.ty) {
                        tracing::trace!(name = %ident.name, "tracking new error binding");
                        self.pending.insert(object.decl, ident.span);
                    }
                }
                IdentRes::Use { object } => {
                    let Some(object) = self.unit.object(object) else {
                        continue;
                    };
                    if !self.unit.implements_error(object.ty) {
                        continue;
                    }
                    // One escalation per statement.
                    if let Some(previous) = self.pending.insert(object.decl, ident.span) {
                        self.escalate(previous);
                        break;
                    }
                }
            }
        }
    }

    pub(crate) fn visit_return(&mut self, ret: &ReturnStmt) {
        for result in &ret.results {
            let resolved = match &result.kind {
                ExprKind::Ident { ident } => self.unit.object_of(ident),
                ExprKind::Call { .. } => self
                    .wrappers
                    .wrapped_cause(self.unit, result)
                    .and_then(|cause| self.unit.object_of(cause)),
                _ => None,
            };

            if let Some(object) = resolved {
                if self.pending.remove(&object.decl).is_some() {
                    tracing::trace!(name = %object.name, "error binding returned");
                }
            }
        }
    }

    pub(crate) fn finish(self) -> Outcome {
        Outcome {
            pending: self.pending,
            escalated: self.escalated,
        }
    }

    fn escalate(&mut self, occurrence: FileSpan) {
        tracing::trace!(file = %occurrence.file, start = occurrence.span.start, "error binding lost");
        self.escalated.push(occurrence);
    }

    fn assigns_error(&self, assign: &AssignStmt, index: usize) -> bool {
        self.assigned_type(assign, index)
            .is_some_and(|ty| self.unit.implements_error(ty))
    }

    /// Type of the value stored into the `index`-th target
    fn assigned_type(&self, assign: &AssignStmt, index: usize) -> Option<TyId> {
        if assign.lhs.len() == assign.rhs.len() {
            return self.unit.type_of(assign.rhs.get(index)?);
        }
        match assign.rhs.as_slice() {
            [single] => self.unit.types.element(self.unit.type_of(single)?, index),
            _ => None,
        }
    }
}
