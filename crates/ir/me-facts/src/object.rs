//! Declared objects and their declaration sites

use crate::ty::TyId;
use me_span::FileSpan;
use serde::{Deserialize, Serialize};

/// Index of an object in a unit's object table
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjId(pub u32);

impl ObjId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source position at which a binding is introduced
///
/// Every use of a variable refers back to exactly one site, so the site is
/// the identity of "the same variable" across reassignments, independent of
/// its spelling.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclSite(pub FileSpan);

impl DeclSite {
    /// Span of the declaring identifier
    #[must_use]
    pub fn span(self) -> FileSpan {
        self.0
    }
}

/// What an object declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Local or package variable
    Var,
    /// Function parameter
    Param,
    /// Named function result
    Result,
    /// Function
    Func,
}

/// A declared entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Declared name
    pub name: String,
    /// Where the object is declared
    pub decl: DeclSite,
    /// Declared type
    pub ty: TyId,
    /// Object kind
    pub kind: ObjectKind,
}
