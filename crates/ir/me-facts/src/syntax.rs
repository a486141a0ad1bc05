//! Syntax tree of a compilation unit
//!
//! Only the shapes the analyses care about are modelled precisely. Anything
//! else is carried as [`ExprKind::Other`] or [`StmtKind::Other`] and skipped.

use crate::object::ObjId;
use crate::ty::TyId;
use me_span::{FileId, FileSpan};
use serde::{Deserialize, Serialize};

/// How an identifier occurrence resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "res", rename_all = "snake_case")]
pub enum IdentRes {
    /// The discard placeholder `_`
    Blank,
    /// Fresh declaration of an object
    Def {
        /// Declared object
        object: ObjId,
    },
    /// Reference to an existing object
    Use {
        /// Referenced object
        object: ObjId,
    },
    /// No symbol information at all
    Unresolved,
}

/// An identifier occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// Spelling
    pub name: String,
    /// Location of this occurrence
    pub span: FileSpan,
    /// Resolution of this occurrence
    #[serde(flatten)]
    pub res: IdentRes,
}

impl Ident {
    /// Object this occurrence declares or refers to
    #[must_use]
    pub fn object(&self) -> Option<ObjId> {
        match self.res {
            IdentRes::Def { object } | IdentRes::Use { object } => Some(object),
            IdentRes::Blank | IdentRes::Unresolved => None,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lit", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// String literal
    String(String),
    /// `nil`
    Nil,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
}

/// An expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    /// Expression kind
    #[serde(flatten)]
    pub kind: ExprKind,
    /// Source location
    pub span: FileSpan,
    /// Static type, when the front end recorded one
    #[serde(default)]
    pub ty: Option<TyId>,
}

/// Kind of expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    /// Plain identifier
    Ident {
        /// The identifier
        ident: Ident,
    },
    /// Function call
    Call {
        /// Called expression
        callee: Box<Expr>,
        /// Arguments in order
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `base.field`, including package-qualified names
    Selector {
        /// Expression left of the dot
        base: Box<Expr>,
        /// Selected name
        field: Ident,
    },
    /// Literal value
    Literal {
        /// The value
        value: Literal,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// Function literal
    FuncLit {
        /// Body of the closure
        body: Block,
    },
    /// Any other expression
    Other,
}

impl Expr {
    /// The identifier, if this is a plain identifier
    #[must_use]
    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident { ident } => Some(ident),
            _ => None,
        }
    }
}

/// A braced statement list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block {
    /// Statements in source order
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// Create a block from its statements
    #[must_use]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// `lhs = rhs` or `lhs := rhs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignStmt {
    /// Targets in order
    pub lhs: Vec<Expr>,
    /// Assigned values in order
    pub rhs: Vec<Expr>,
    /// Whether this is a declaring assignment
    #[serde(default)]
    pub define: bool,
}

/// `return results...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStmt {
    /// Result expressions; empty for a bare return
    #[serde(default)]
    pub results: Vec<Expr>,
}

/// A statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    /// Statement kind
    #[serde(flatten)]
    pub kind: StmtKind,
    /// Source location
    pub span: FileSpan,
}

/// Kind of statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    /// Assignment
    Assign(AssignStmt),
    /// Return
    Return(ReturnStmt),
    /// Expression evaluated for its effects
    Expr {
        /// The expression
        expr: Expr,
    },
    /// `if init; cond { then } else ...`
    If {
        /// Optional init statement
        #[serde(default)]
        init: Option<Box<Stmt>>,
        /// Condition
        cond: Expr,
        /// Then branch
        then_branch: Block,
        /// Else branch: a block or another `if`
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    /// `for init; cond; post { body }`
    For {
        /// Optional init statement
        #[serde(default)]
        init: Option<Box<Stmt>>,
        /// Optional condition
        #[serde(default)]
        cond: Option<Expr>,
        /// Optional post statement
        #[serde(default)]
        post: Option<Box<Stmt>>,
        /// Loop body
        body: Block,
    },
    /// Nested block
    Block {
        /// The block
        block: Block,
    },
    /// Any other statement
    Other,
}

/// A group of parameters or results sharing a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Declared names; empty for unnamed parameters
    #[serde(default)]
    pub names: Vec<Ident>,
    /// Declared type
    pub ty: TyId,
}

/// A function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    /// Function name
    pub name: Ident,
    /// Parameter list
    #[serde(default)]
    pub params: Vec<Field>,
    /// Result list
    #[serde(default)]
    pub results: Vec<Field>,
    /// Body; absent for external declarations
    #[serde(default)]
    pub body: Option<Block>,
    /// Source location of the whole declaration
    pub span: FileSpan,
}

impl FuncDecl {
    /// Named result identifiers, in declaration order
    pub fn named_results(&self) -> impl Iterator<Item = (&Ident, TyId)> {
        self.results
            .iter()
            .flat_map(|field| field.names.iter().map(move |name| (name, field.ty)))
    }
}

/// A source file of the unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File id used by every span in this file
    pub id: FileId,
    /// Display name
    pub name: String,
    /// Byte offsets at which each line starts
    #[serde(default)]
    pub line_starts: Vec<u32>,
    /// Function declarations in source order
    #[serde(default)]
    pub decls: Vec<FuncDecl>,
}

impl SourceFile {
    /// One-based line and column of a byte offset
    ///
    /// Returns `None` when the file carries no line table.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> Option<(u32, u32)> {
        if self.line_starts.is_empty() {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.checked_sub(1)?,
        };
        let start = self.line_starts[line];
        Some((line as u32 + 1, offset - start + 1))
    }
}
