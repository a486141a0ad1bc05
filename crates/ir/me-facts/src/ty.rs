//! Type representation
//!
//! Types are stored in a flat table and addressed by [`TyId`]. The table is
//! produced by the front end that type-checked the unit; this crate only
//! answers questions about it.

use serde::{Deserialize, Serialize};

/// Name of the description method that makes a type error-like
pub const ERROR_METHOD: &str = "Error";

/// Index of a type in a [`TyTable`]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TyId(pub u32);

impl TyId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type in the type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ty {
    /// Type kind
    #[serde(flatten)]
    pub kind: TyKind,
}

/// Predeclared basic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `string`
    String,
    /// Type of the untyped `nil` literal
    UntypedNil,
    /// The empty interface
    Any,
}

/// A method in a method set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Method signature (a [`TyKind::Signature`])
    pub sig: TyId,
}

/// Kind of type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TyKind {
    /// Predeclared basic type
    Basic {
        /// Which basic type
        basic: BasicKind,
    },

    /// Declared type with its own identity
    Named {
        /// Type name, qualified by package where relevant
        name: String,
        /// Underlying type
        underlying: TyId,
        /// Methods declared on the type
        #[serde(default)]
        methods: Vec<Method>,
    },

    /// Pointer type
    Pointer {
        /// Pointee type
        elem: TyId,
    },

    /// Slice type
    Slice {
        /// Element type
        elem: TyId,
    },

    /// Interface type
    Interface {
        /// Methods required by the interface
        #[serde(default)]
        methods: Vec<Method>,
    },

    /// Function signature
    Signature {
        /// Parameter types
        #[serde(default)]
        params: Vec<TyId>,
        /// Result types
        #[serde(default)]
        results: Vec<TyId>,
        /// Whether the last parameter is variadic
        #[serde(default)]
        variadic: bool,
    },

    /// Type of a declared function object
    ///
    /// Two function objects share a type only when they are the same
    /// declaration, so an aliased import of a function keeps its identity
    /// while an unrelated function with the same signature does not.
    Func {
        /// Declaring package path
        package: String,
        /// Function name
        name: String,
        /// Signature of the function
        sig: TyId,
    },

    /// Result list of a multi-valued call
    Tuple {
        /// Component types
        elements: Vec<TyId>,
    },
}

/// Flat table of types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TyTable {
    tys: Vec<Ty>,
}

impl TyTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type and return its id
    pub fn alloc(&mut self, kind: TyKind) -> TyId {
        let id = TyId(u32::try_from(self.tys.len()).unwrap_or(u32::MAX));
        self.tys.push(Ty { kind });
        id
    }

    /// Look up a type
    #[must_use]
    pub fn get(&self, id: TyId) -> Option<&Ty> {
        self.tys.get(id.index())
    }

    /// Number of types in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.tys.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tys.is_empty()
    }

    /// Iterate over all types with their ids
    pub fn iter(&self) -> impl Iterator<Item = (TyId, &Ty)> {
        self.tys
            .iter()
            .enumerate()
            .map(|(index, ty)| (TyId(index as u32), ty))
    }

    fn kind(&self, id: TyId) -> Option<&TyKind> {
        self.get(id).map(|ty| &ty.kind)
    }

    /// The `index`-th component of a tuple type
    #[must_use]
    pub fn element(&self, id: TyId, index: usize) -> Option<TyId> {
        match self.kind(id)? {
            TyKind::Tuple { elements } => elements.get(index).copied(),
            _ => None,
        }
    }

    /// Whether `id` satisfies the error capability
    ///
    /// A type is error-like when its method set contains `Error() string`.
    #[must_use]
    pub fn implements_error(&self, id: TyId) -> bool {
        self.method_set(id)
            .iter()
            .any(|method| method.name == ERROR_METHOD && self.is_description_sig(method.sig))
    }

    /// Methods callable on a value of type `id`
    #[must_use]
    pub fn method_set(&self, id: TyId) -> Vec<&Method> {
        let mut methods = Vec::new();
        self.collect_methods(id, &mut methods, 0);
        methods
    }

    fn collect_methods<'a>(&'a self, id: TyId, out: &mut Vec<&'a Method>, depth: usize) {
        // Underlying chains are acyclic in well-formed input; bail on garbage.
        if depth > 8 {
            return;
        }
        match self.kind(id) {
            Some(TyKind::Named {
                underlying,
                methods,
                ..
            }) => {
                out.extend(methods);
                if let Some(TyKind::Interface { methods }) = self.kind(*underlying) {
                    out.extend(methods);
                }
            }
            Some(TyKind::Interface { methods }) => out.extend(methods),
            Some(TyKind::Pointer { elem }) => {
                if let Some(TyKind::Named { .. }) = self.kind(*elem) {
                    self.collect_methods(*elem, out, depth + 1);
                }
            }
            _ => {}
        }
    }

    /// `func() string`
    fn is_description_sig(&self, sig: TyId) -> bool {
        match self.kind(sig) {
            Some(TyKind::Signature {
                params,
                results,
                variadic: false,
            }) => {
                params.is_empty()
                    && matches!(
                        results.as_slice(),
                        [result] if self.kind(*result)
                            == Some(&TyKind::Basic { basic: BasicKind::String })
                    )
            }
            _ => false,
        }
    }

    /// Whether two types are identical
    ///
    /// Named types are identical only to themselves. Everything else is
    /// compared structurally.
    #[must_use]
    pub fn identical(&self, left: TyId, right: TyId) -> bool {
        self.identical_at(left, right, 0)
    }

    fn identical_at(&self, left: TyId, right: TyId, depth: usize) -> bool {
        if left == right {
            return true;
        }
        if depth > 16 {
            return false;
        }
        let (Some(lhs), Some(rhs)) = (self.kind(left), self.kind(right)) else {
            return false;
        };
        let next = depth + 1;
        match (lhs, rhs) {
            (TyKind::Basic { basic: a }, TyKind::Basic { basic: b }) => a == b,
            (TyKind::Pointer { elem: a }, TyKind::Pointer { elem: b })
            | (TyKind::Slice { elem: a }, TyKind::Slice { elem: b }) => {
                self.identical_at(*a, *b, next)
            }
            (TyKind::Interface { methods: a }, TyKind::Interface { methods: b }) => {
                a.len() == b.len()
                    && a.iter().all(|method| {
                        b.iter().any(|other| {
                            other.name == method.name
                                && self.identical_at(method.sig, other.sig, next)
                        })
                    })
            }
            (
                TyKind::Signature {
                    params: params_a,
                    results: results_a,
                    variadic: variadic_a,
                },
                TyKind::Signature {
                    params: params_b,
                    results: results_b,
                    variadic: variadic_b,
                },
            ) => {
                variadic_a == variadic_b
                    && self.all_identical(params_a, params_b, next)
                    && self.all_identical(results_a, results_b, next)
            }
            (
                TyKind::Func {
                    package: package_a,
                    name: name_a,
                    sig: sig_a,
                },
                TyKind::Func {
                    package: package_b,
                    name: name_b,
                    sig: sig_b,
                },
            ) => package_a == package_b && name_a == name_b && self.identical_at(*sig_a, *sig_b, next),
            (TyKind::Tuple { elements: a }, TyKind::Tuple { elements: b }) => {
                self.all_identical(a, b, next)
            }
            _ => false,
        }
    }

    fn all_identical(&self, left: &[TyId], right: &[TyId], depth: usize) -> bool {
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(a, b)| self.identical_at(*a, *b, depth))
    }

    /// Result types of a signature or function type
    #[must_use]
    pub fn results(&self, id: TyId) -> Option<&[TyId]> {
        match self.kind(id)? {
            TyKind::Signature { results, .. } => Some(results),
            TyKind::Func { sig, .. } => self.results(*sig),
            _ => None,
        }
    }
}
