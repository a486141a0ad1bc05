//! Trusted wrapper functions
//!
//! A wrapper is a function that re-raises an existing error inside its own
//! result, such as `fmt.Errorf("...: %w", err)`. Entries are matched by the
//! type of the called function, so aliased imports still count.

use crate::error::{LintError, LintResult};
use me_facts::{Expr, ExprKind, Ident, TyId, Unit};

/// One parsed `<package>.<name>` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrapperName {
    /// Package path, e.g. `fmt` or `a/helper`
    pub namespace: String,
    /// Function name
    pub name: String,
}

/// Split a comma-separated wrapper list into its entries
///
/// # Errors
///
/// Returns [`LintError::InvalidWrapper`] for the first entry that does not
/// split into exactly two non-empty dot-separated parts.
pub fn parse_wrappers(list: &str) -> LintResult<Vec<WrapperName>> {
    list.split(',').map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> LintResult<WrapperName> {
    let trimmed = entry.trim();
    let invalid = || LintError::InvalidWrapper {
        entry: trimmed.to_string(),
    };

    let mut parts = trimmed.split('.');
    let (Some(namespace), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if namespace.is_empty() || name.is_empty() {
        return Err(invalid());
    }

    Ok(WrapperName {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })
}

/// Wrapper functions resolved against one unit
#[derive(Debug, Clone, Default)]
pub struct WrapperRegistry {
    types: Vec<TyId>,
}

impl WrapperRegistry {
    /// Parse `list` and resolve every entry in `unit`
    ///
    /// Entries that name a function the unit cannot see are skipped with a
    /// warning; they can never match a call in this unit.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidWrapper`] if `list` is malformed.
    pub fn resolve(unit: &Unit, list: &str) -> LintResult<Self> {
        let mut types = Vec::new();
        for wrapper in parse_wrappers(list)? {
            match unit.lookup(&wrapper.namespace, &wrapper.name) {
                Some(ty) => types.push(ty),
                None => tracing::warn!(
                    namespace = %wrapper.namespace,
                    name = %wrapper.name,
                    "wrapper function is not visible from this unit"
                ),
            }
        }
        Ok(Self { types })
    }

    /// Number of resolved wrappers
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no wrapper resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `callee` has the type of a resolved wrapper
    #[must_use]
    pub fn matches(&self, unit: &Unit, callee: &Expr) -> bool {
        let Some(ty) = unit.type_of(callee) else {
            return false;
        };
        self.types
            .iter()
            .any(|&wrapper| unit.types.identical(ty, wrapper))
    }

    /// The error a wrapper call re-raises
    ///
    /// This is the first argument that is a plain identifier of error type.
    /// Calls to anything other than a resolved wrapper yield `None`.
    #[must_use]
    pub fn wrapped_cause<'a>(&self, unit: &Unit, call: &'a Expr) -> Option<&'a Ident> {
        let ExprKind::Call { callee, args } = &call.kind else {
            return None;
        };
        if !self.matches(unit, callee) {
            return None;
        }
        args.iter().filter_map(Expr::as_ident).find(|ident| {
            unit.object_of(ident)
                .is_some_and(|object| unit.implements_error(object.ty))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_facts::{BasicKind, TyKind, UnitBuilder};

    #[test]
    fn test_parse_default() {
        let parsed = parse_wrappers("fmt.Errorf").expect("default list parses");
        assert_eq!(
            parsed,
            vec![WrapperName {
                namespace: "fmt".to_string(),
                name: "Errorf".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_package_path_with_slash() {
        let parsed = parse_wrappers("fmt.Errorf, a/helper.Wrap").expect("list parses");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].namespace, "a/helper");
        assert_eq!(parsed[1].name, "Wrap");
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        for (list, entry) in [
            ("Errorf", "Errorf"),
            ("fmt.Errorf,", ""),
            ("", ""),
            ("github.com/pkg/errors.Wrap", "github.com/pkg/errors.Wrap"),
            ("fmt.", "fmt."),
            (" .Errorf", ".Errorf"),
        ] {
            let err = parse_wrappers(list).expect_err(list);
            assert_eq!(
                err,
                LintError::InvalidWrapper {
                    entry: entry.to_string()
                },
                "list {list:?}"
            );
        }
    }

    #[test]
    fn test_invalid_wrapper_message() {
        let err = parse_wrappers("Errorf").expect_err("no package");
        assert_eq!(
            err.to_string(),
            "invalid flag. wrapper function must be <package>.<name> format: \"Errorf\""
        );
    }

    #[test]
    fn test_resolve_skips_unknown_functions() {
        let mut b = UnitBuilder::new("a");
        b.import_errorf();
        let unit = b.finish();

        let registry =
            WrapperRegistry::resolve(&unit, "fmt.Errorf,errors.Wrap").expect("list parses");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_wrapped_cause_is_first_error_ident() {
        let mut b = UnitBuilder::new("a");
        let error = b.error_type();
        let errorf = b.import_errorf();
        let (_, first) = b.define("first", error);
        let (_, second) = b.define("second", error);

        let format = b.string_lit("%w %w");
        let first_use = b.var(first);
        let second_use = b.var(second);
        let call = b.qualified_call("fmt", errorf, vec![format, first_use, second_use]);
        let unit = b.finish();

        let registry = WrapperRegistry::resolve(&unit, "fmt.Errorf").expect("list parses");
        let cause = registry
            .wrapped_cause(&unit, &call)
            .expect("fmt.Errorf wraps its first error argument");
        assert_eq!(
            unit.object_of(cause).map(|object| object.decl),
            unit.object(first).map(|object| object.decl)
        );
    }

    #[test]
    fn test_same_signature_is_not_a_wrapper() {
        let mut b = UnitBuilder::new("a");
        let error = b.error_type();
        let string = b.string_type();
        let any = b.basic(BasicKind::Any);
        let args = b.types_mut().alloc(TyKind::Slice { elem: any });
        b.import_errorf();
        let sig = b.signature(vec![string, args], vec![error], true);
        let lookalike = b.import_func("a/errs", "Errorf", sig);
        let (_, err) = b.define("err", error);

        let format = b.string_lit("%w");
        let cause = b.var(err);
        let call = b.qualified_call("errs", lookalike, vec![format, cause]);
        let unit = b.finish();

        let registry = WrapperRegistry::resolve(&unit, "fmt.Errorf").expect("list parses");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.wrapped_cause(&unit, &call), None);
    }
}
