//! Source and type facts for a compilation unit
//!
//! This crate is the boundary between a language front end and the analyses
//! in this workspace. A front end parses and type-checks a package and dumps
//! what it learned as a [`Unit`]: the function declarations with their
//! statements, a table of types, and a table of declared objects. Analyses
//! read the unit through a small query surface:
//!
//! - [`Unit::statements`]: assignments and returns in preorder
//! - [`Unit::object_of`] / [`Unit::type_of`]: identifier and expression facts
//! - [`Unit::implements_error`]: the error capability predicate
//! - [`Unit::lookup`]: `<namespace>.<name>` resolution
//!
//! Units are usually loaded with [`Unit::from_json`]. Tests and embedders
//! can assemble them with [`UnitBuilder`].

pub mod builder;
pub mod error;
pub mod object;
pub mod syntax;
pub mod ty;
pub mod unit;
pub mod walk;

pub use builder::UnitBuilder;
pub use error::{FactsError, FactsResult};
pub use object::{DeclSite, ObjId, Object, ObjectKind};
pub use syntax::{
    AssignStmt, BinaryOp, Block, Expr, ExprKind, Field, FuncDecl, Ident, IdentRes, Literal,
    ReturnStmt, SourceFile, Stmt, StmtKind,
};
pub use ty::{BasicKind, Method, Ty, TyId, TyKind, TyTable};
pub use unit::{Member, PackageScope, Unit};
pub use walk::{Statements, TrackedStmt};
