//! A type-checked compilation unit

use crate::error::{FactsError, FactsResult};
use crate::object::{ObjId, Object};
use crate::syntax::{Expr, ExprKind, FuncDecl, Ident, SourceFile};
use crate::ty::{TyId, TyKind, TyTable};
use crate::walk::Statements;
use me_span::FileId;
use serde::{Deserialize, Serialize};

/// Exported members of a package visible from the unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageScope {
    /// Package path, e.g. `fmt` or `a/helper`
    pub path: String,
    /// Members by name
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A named package member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member name
    pub name: String,
    /// Declared object
    pub object: ObjId,
}

impl PackageScope {
    /// Find a member by name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ObjId> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.object)
    }
}

/// One compilation unit: a package's files plus the facts the type checker
/// recorded for them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Package path of the unit
    pub package: String,
    /// Source files in order
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Type table
    #[serde(default)]
    pub types: TyTable,
    /// Object table
    #[serde(default)]
    pub objects: Vec<Object>,
    /// Package-level members of the unit itself
    #[serde(default)]
    pub scope: Vec<Member>,
    /// Packages imported by the unit
    #[serde(default)]
    pub imports: Vec<PackageScope>,
}

impl Unit {
    /// Decode a unit from its JSON fact dump and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid fact dump or refers to
    /// types or objects it does not define.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn from_json(text: &str) -> FactsResult<Self> {
        let unit: Self = serde_json::from_str(text)?;
        unit.validate()?;
        tracing::debug!(
            package = %unit.package,
            files = unit.files.len(),
            types = unit.types.len(),
            objects = unit.objects.len(),
            "loaded unit"
        );
        Ok(unit)
    }

    /// Check that every table reference points inside its table
    ///
    /// # Errors
    ///
    /// Returns the first dangling reference found.
    pub fn validate(&self) -> FactsResult<()> {
        for (id, ty) in self.types.iter() {
            for referenced in referenced_types(&ty.kind) {
                self.check_ty(referenced, &format!("type {}", id.0))?;
            }
        }
        for (index, object) in self.objects.iter().enumerate() {
            self.check_ty(object.ty, &format!("object `{}` ({index})", object.name))?;
        }
        for member in self.scope.iter().chain(self.imports.iter().flat_map(|p| &p.members)) {
            self.check_obj(member.object, &format!("member `{}`", member.name))?;
        }
        let mut seen = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if seen.contains(&file.id) {
                return Err(FactsError::DuplicateFile {
                    file: file.id,
                    name: file.name.clone(),
                });
            }
            seen.push(file.id);
        }
        Ok(())
    }

    fn check_ty(&self, id: TyId, owner: &str) -> FactsResult<()> {
        if self.types.get(id).is_some() {
            Ok(())
        } else {
            Err(FactsError::DanglingType {
                id: id.0,
                owner: owner.to_string(),
            })
        }
    }

    fn check_obj(&self, id: ObjId, owner: &str) -> FactsResult<()> {
        if self.object(id).is_some() {
            Ok(())
        } else {
            Err(FactsError::DanglingObject {
                id: id.0,
                owner: owner.to_string(),
            })
        }
    }

    /// Look up an object
    #[must_use]
    pub fn object(&self, id: ObjId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    /// Object an identifier occurrence declares or refers to
    #[must_use]
    pub fn object_of(&self, ident: &Ident) -> Option<&Object> {
        ident.object().and_then(|id| self.object(id))
    }

    /// Static type of an expression
    ///
    /// Identifiers take the type of their object; other expressions use the
    /// type recorded on the node.
    #[must_use]
    pub fn type_of(&self, expr: &Expr) -> Option<TyId> {
        match &expr.kind {
            ExprKind::Ident { ident } => self.object_of(ident).map(|object| object.ty).or(expr.ty),
            ExprKind::Selector { field, .. } => {
                expr.ty.or_else(|| self.object_of(field).map(|object| object.ty))
            }
            _ => expr.ty,
        }
    }

    /// Whether `ty` satisfies the error capability
    #[must_use]
    pub fn implements_error(&self, ty: TyId) -> bool {
        self.types.implements_error(ty)
    }

    /// Resolve `<namespace>.<name>` to the type of the named object
    ///
    /// The unit's own package is searched first, then its imports.
    #[must_use]
    pub fn lookup(&self, namespace: &str, name: &str) -> Option<TyId> {
        let object = if namespace == self.package {
            self.scope
                .iter()
                .find(|member| member.name == name)
                .map(|member| member.object)
        } else {
            self.imports
                .iter()
                .find(|package| package.path == namespace)
                .and_then(|package| package.lookup(name))
        }?;
        self.object(object).map(|object| object.ty)
    }

    /// Function declarations of every file, in source order
    pub fn func_decls(&self) -> impl Iterator<Item = &FuncDecl> {
        self.files.iter().flat_map(|file| &file.decls)
    }

    /// Assignment and return statements in preorder
    #[must_use]
    pub fn statements(&self) -> Statements<'_> {
        Statements::new(self)
    }

    /// Find a source file by id
    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.id == id)
    }
}

fn referenced_types(kind: &TyKind) -> Vec<TyId> {
    match kind {
        TyKind::Basic { .. } => Vec::new(),
        TyKind::Named {
            underlying,
            methods,
            ..
        } => std::iter::once(*underlying)
            .chain(methods.iter().map(|method| method.sig))
            .collect(),
        TyKind::Pointer { elem } | TyKind::Slice { elem } => vec![*elem],
        TyKind::Interface { methods } => methods.iter().map(|method| method.sig).collect(),
        TyKind::Signature {
            params, results, ..
        } => params.iter().chain(results).copied().collect(),
        TyKind::Func { sig, .. } => vec![*sig],
        TyKind::Tuple { elements } => elements.clone(),
    }
}
