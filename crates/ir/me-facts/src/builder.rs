//! Programmatic construction of units
//!
//! Positions are handed out in creation order, so nodes should be created in
//! the order they appear in the source they stand for. Every identifier gets
//! a distinct span, which keeps declaration sites unique.

use crate::object::{DeclSite, ObjId, Object, ObjectKind};
use crate::syntax::{
    AssignStmt, BinaryOp, Block, Expr, ExprKind, Field, FuncDecl, Ident, IdentRes, Literal,
    ReturnStmt, SourceFile, Stmt, StmtKind,
};
use crate::ty::{BasicKind, Method, TyId, TyKind, TyTable, ERROR_METHOD};
use crate::unit::{Member, PackageScope, Unit};
use me_span::{FileId, FileSpan, Span};

/// File id reserved for objects declared outside the unit
const EXTERNAL_FILE: FileId = FileId(u32::MAX);

/// Incremental builder for a [`Unit`]
pub struct UnitBuilder {
    unit: Unit,
    file: usize,
    cursor: u32,
    external_cursor: u32,
    basics: Vec<(BasicKind, TyId)>,
    error: Option<TyId>,
}

impl UnitBuilder {
    /// Start a unit for `package` with one empty file
    #[must_use]
    pub fn new(package: &str) -> Self {
        let mut builder = Self {
            unit: Unit {
                package: package.to_string(),
                ..Unit::default()
            },
            file: 0,
            cursor: 0,
            external_cursor: 0,
            basics: Vec::new(),
            error: None,
        };
        let name = format!("{}.go", package.rsplit('/').next().unwrap_or(package));
        builder.new_file(&name);
        builder
    }

    /// Start a new file; subsequent declarations go into it
    pub fn new_file(&mut self, name: &str) -> FileId {
        let id = FileId(self.unit.files.len() as u32);
        self.unit.files.push(SourceFile {
            id,
            name: name.to_string(),
            line_starts: Vec::new(),
            decls: Vec::new(),
        });
        self.file = self.unit.files.len() - 1;
        self.cursor = 0;
        id
    }

    fn file_id(&self) -> FileId {
        self.unit.files[self.file].id
    }

    fn span(&mut self, len: usize) -> FileSpan {
        let start = self.cursor;
        let end = start + (len.max(1) as u32);
        self.cursor = end + 1;
        FileSpan::new(self.file_id(), Span::new(start, end))
    }

    fn external_span(&mut self) -> FileSpan {
        let start = self.external_cursor;
        self.external_cursor += 1;
        FileSpan::new(EXTERNAL_FILE, Span::new(start, start + 1))
    }

    fn alloc_object(&mut self, name: &str, decl: FileSpan, ty: TyId, kind: ObjectKind) -> ObjId {
        let id = ObjId(self.unit.objects.len() as u32);
        self.unit.objects.push(Object {
            name: name.to_string(),
            decl: DeclSite(decl),
            ty,
            kind,
        });
        id
    }

    /// Mutable access to the type table
    pub fn types_mut(&mut self) -> &mut TyTable {
        &mut self.unit.types
    }

    /// A basic type, allocated once per kind
    pub fn basic(&mut self, basic: BasicKind) -> TyId {
        if let Some((_, id)) = self.basics.iter().find(|(kind, _)| *kind == basic) {
            return *id;
        }
        let id = self.unit.types.alloc(TyKind::Basic { basic });
        self.basics.push((basic, id));
        id
    }

    /// `int`
    pub fn int_type(&mut self) -> TyId {
        self.basic(BasicKind::Int)
    }

    /// `string`
    pub fn string_type(&mut self) -> TyId {
        self.basic(BasicKind::String)
    }

    /// `bool`
    pub fn bool_type(&mut self) -> TyId {
        self.basic(BasicKind::Bool)
    }

    /// The predeclared `error` interface
    pub fn error_type(&mut self) -> TyId {
        if let Some(id) = self.error {
            return id;
        }
        let string = self.string_type();
        let sig = self.signature(Vec::new(), vec![string], false);
        let iface = self.unit.types.alloc(TyKind::Interface {
            methods: vec![Method {
                name: ERROR_METHOD.to_string(),
                sig,
            }],
        });
        let id = self.unit.types.alloc(TyKind::Named {
            name: "error".to_string(),
            underlying: iface,
            methods: Vec::new(),
        });
        self.error = Some(id);
        id
    }

    /// A function signature type
    pub fn signature(&mut self, params: Vec<TyId>, results: Vec<TyId>, variadic: bool) -> TyId {
        self.unit.types.alloc(TyKind::Signature {
            params,
            results,
            variadic,
        })
    }

    /// A tuple type
    pub fn tuple(&mut self, elements: Vec<TyId>) -> TyId {
        self.unit.types.alloc(TyKind::Tuple { elements })
    }

    /// Declare function `name` with signature `sig` in the imported package
    /// `package`
    pub fn import_func(&mut self, package: &str, name: &str, sig: TyId) -> ObjId {
        let ty = self.unit.types.alloc(TyKind::Func {
            package: package.to_string(),
            name: name.to_string(),
            sig,
        });
        let decl = self.external_span();
        let object = self.alloc_object(name, decl, ty, ObjectKind::Func);
        let member = Member {
            name: name.to_string(),
            object,
        };
        match self.unit.imports.iter_mut().find(|scope| scope.path == package) {
            Some(scope) => scope.members.push(member),
            None => self.unit.imports.push(PackageScope {
                path: package.to_string(),
                members: vec![member],
            }),
        }
        object
    }

    /// `fmt.Errorf(format string, a ...any) error`
    pub fn import_errorf(&mut self) -> ObjId {
        let string = self.string_type();
        let any = self.basic(BasicKind::Any);
        let slice = self.unit.types.alloc(TyKind::Slice { elem: any });
        let error = self.error_type();
        let sig = self.signature(vec![string, slice], vec![error], true);
        self.import_func("fmt", "Errorf", sig)
    }

    fn declare_func(
        &mut self,
        name: &str,
        params: Vec<Field>,
        results: Vec<Field>,
        body: Option<Block>,
    ) -> ObjId {
        let param_tys = expand_field_types(&params);
        let result_tys = expand_field_types(&results);
        let sig = self.signature(param_tys, result_tys, false);
        let ty = self.unit.types.alloc(TyKind::Func {
            package: self.unit.package.clone(),
            name: name.to_string(),
            sig,
        });
        let span = self.span(name.len());
        let object = self.alloc_object(name, span, ty, ObjectKind::Func);
        self.unit.scope.push(Member {
            name: name.to_string(),
            object,
        });
        let decl = FuncDecl {
            name: Ident {
                name: name.to_string(),
                span,
                res: IdentRes::Def { object },
            },
            params,
            results,
            body,
            span,
        };
        self.unit.files[self.file].decls.push(decl);
        object
    }

    /// Declare function `name` with a body
    pub fn func(
        &mut self,
        name: &str,
        params: Vec<Field>,
        results: Vec<Field>,
        body: Vec<Stmt>,
    ) -> ObjId {
        self.declare_func(name, params, results, Some(Block::new(body)))
    }

    /// Declare function `name` without a body
    pub fn extern_func(&mut self, name: &str, params: Vec<Field>, results: Vec<Field>) -> ObjId {
        self.declare_func(name, params, results, None)
    }

    fn declared_field(&mut self, name: &str, ty: TyId, kind: ObjectKind) -> (Field, ObjId) {
        let (ident, object) = self.declare_ident(name, ty, kind);
        (
            Field {
                names: vec![ident],
                ty,
            },
            object,
        )
    }

    /// A named parameter
    pub fn param(&mut self, name: &str, ty: TyId) -> (Field, ObjId) {
        self.declared_field(name, ty, ObjectKind::Param)
    }

    /// A named result
    pub fn named_result(&mut self, name: &str, ty: TyId) -> (Field, ObjId) {
        self.declared_field(name, ty, ObjectKind::Result)
    }

    /// An unnamed parameter or result
    #[must_use]
    pub fn unnamed(&self, ty: TyId) -> Field {
        Field {
            names: Vec::new(),
            ty,
        }
    }

    fn declare_ident(&mut self, name: &str, ty: TyId, kind: ObjectKind) -> (Ident, ObjId) {
        let span = self.span(name.len());
        let object = self.alloc_object(name, span, ty, kind);
        let ident = Ident {
            name: name.to_string(),
            span,
            res: IdentRes::Def { object },
        };
        (ident, object)
    }

    fn use_ident(&mut self, object: ObjId) -> (Ident, Option<TyId>) {
        let (name, ty) = match self.unit.object(object) {
            Some(found) => (found.name.clone(), Some(found.ty)),
            None => (String::from("?"), None),
        };
        let span = self.span(name.len());
        let ident = Ident {
            name,
            span,
            res: IdentRes::Use { object },
        };
        (ident, ty)
    }

    fn ident_expr(ident: Ident, ty: Option<TyId>) -> Expr {
        let span = ident.span;
        Expr {
            kind: ExprKind::Ident { ident },
            span,
            ty,
        }
    }

    /// Fresh declaration of a local variable
    pub fn define(&mut self, name: &str, ty: TyId) -> (Expr, ObjId) {
        let (ident, object) = self.declare_ident(name, ty, ObjectKind::Var);
        (Self::ident_expr(ident, Some(ty)), object)
    }

    /// A use of an existing object
    pub fn var(&mut self, object: ObjId) -> Expr {
        let (ident, ty) = self.use_ident(object);
        Self::ident_expr(ident, ty)
    }

    /// The discard placeholder `_`
    pub fn blank(&mut self) -> Expr {
        let span = self.span(1);
        Self::ident_expr(
            Ident {
                name: "_".to_string(),
                span,
                res: IdentRes::Blank,
            },
            None,
        )
    }

    /// An identifier without symbol information
    pub fn unresolved(&mut self, name: &str) -> Expr {
        let span = self.span(name.len());
        Self::ident_expr(
            Ident {
                name: name.to_string(),
                span,
                res: IdentRes::Unresolved,
            },
            None,
        )
    }

    fn call_result(&mut self, callee_ty: Option<TyId>) -> Option<TyId> {
        let results = self.unit.types.results(callee_ty?)?.to_vec();
        match results.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => Some(self.tuple(results)),
        }
    }

    fn finish_call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        let ty = self.call_result(callee.ty);
        let span = args
            .iter()
            .fold(callee.span, |span, arg| span.cover(arg.span));
        Expr {
            kind: ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
            ty,
        }
    }

    /// `func(args...)` for a function visible by its bare name
    pub fn call(&mut self, func: ObjId, args: Vec<Expr>) -> Expr {
        let callee = self.var(func);
        self.finish_call(callee, args)
    }

    /// `alias.func(args...)` for a function of an imported package
    pub fn qualified_call(&mut self, alias: &str, func: ObjId, args: Vec<Expr>) -> Expr {
        let base = self.unresolved(alias);
        let (field, ty) = self.use_ident(func);
        let callee = Expr {
            span: base.span.cover(field.span),
            kind: ExprKind::Selector {
                base: Box::new(base),
                field,
            },
            ty,
        };
        self.finish_call(callee, args)
    }

    fn literal(&mut self, value: Literal, len: usize, ty: TyId) -> Expr {
        let span = self.span(len);
        Expr {
            kind: ExprKind::Literal { value },
            span,
            ty: Some(ty),
        }
    }

    /// A string literal
    pub fn string_lit(&mut self, value: &str) -> Expr {
        let ty = self.string_type();
        self.literal(Literal::String(value.to_string()), value.len() + 2, ty)
    }

    /// An integer literal
    pub fn int_lit(&mut self, value: i64) -> Expr {
        let ty = self.int_type();
        self.literal(Literal::Int(value), value.to_string().len(), ty)
    }

    /// `nil`
    pub fn nil(&mut self) -> Expr {
        let ty = self.basic(BasicKind::UntypedNil);
        self.literal(Literal::Nil, 3, ty)
    }

    /// `lhs op rhs`
    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let ty = match op {
            BinaryOp::Add | BinaryOp::Sub => lhs.ty,
            _ => Some(self.bool_type()),
        };
        Expr {
            span: lhs.span.cover(rhs.span),
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        }
    }

    /// `func() { body }`
    pub fn func_lit(&mut self, body: Vec<Stmt>) -> Expr {
        let span = self.span(4);
        Expr {
            kind: ExprKind::FuncLit {
                body: Block::new(body),
            },
            span,
            ty: None,
        }
    }

    fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let span = self.span(1);
        Stmt { kind, span }
    }

    fn assignment(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>, define: bool) -> Stmt {
        self.stmt(StmtKind::Assign(AssignStmt { lhs, rhs, define }))
    }

    /// `lhs = rhs`
    pub fn assign_stmt(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        self.assignment(lhs, rhs, false)
    }

    /// `lhs := rhs`
    pub fn define_stmt(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        self.assignment(lhs, rhs, true)
    }

    /// `return results...`
    pub fn return_stmt(&mut self, results: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(ReturnStmt { results }))
    }

    /// An expression statement
    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr { expr })
    }

    /// `if init; cond { then } else ...`
    pub fn if_stmt(
        &mut self,
        init: Option<Stmt>,
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Stmt>,
    ) -> Stmt {
        self.stmt(StmtKind::If {
            init: init.map(Box::new),
            cond,
            then_branch: Block::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    /// `for init; cond; post { body }`
    pub fn for_stmt(
        &mut self,
        init: Option<Stmt>,
        cond: Option<Expr>,
        post: Option<Stmt>,
        body: Vec<Stmt>,
    ) -> Stmt {
        self.stmt(StmtKind::For {
            init: init.map(Box::new),
            cond,
            post: post.map(Box::new),
            body: Block::new(body),
        })
    }

    /// `{ stmts }`
    pub fn block_stmt(&mut self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block {
            block: Block::new(stmts),
        })
    }

    /// Finish building
    #[must_use]
    pub fn finish(self) -> Unit {
        self.unit
    }
}

/// One type per declared name, or one per unnamed field
fn expand_field_types(fields: &[Field]) -> Vec<TyId> {
    fields
        .iter()
        .flat_map(|field| std::iter::repeat_n(field.ty, field.names.len().max(1)))
        .collect()
}
