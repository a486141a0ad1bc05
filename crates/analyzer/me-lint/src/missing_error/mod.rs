//! Error values that never leave their function
//!
//! The pass walks every assignment and return of a unit once. An error-typed
//! binding stays pending until a return names it, directly or wrapped in a
//! call to a configured wrapper function. Bindings that are overwritten while
//! pending, assigned to `_`, or still pending at the end of the unit are
//! reported, except for named results which a bare `return` hands back.

mod named_results;
mod report;
mod tracker;
mod wrappers;

pub use wrappers::{parse_wrappers, WrapperName, WrapperRegistry};

use crate::{Diagnostic, LintContext, LintLevel, LintResult, LintRule};
use me_facts::{TrackedStmt, Unit};
use me_span::FileSpan;
use serde::{Deserialize, Serialize};
use tracker::Tracker;

/// Documentation string of the pass
pub const DOC: &str = "missingerror finds errors which are not returned from function";

/// Wrapper list used when none is configured
pub const DEFAULT_WRAPPERS: &str = "fmt.Errorf";

/// Message attached to every finding
pub const MESSAGE: &str = "error wasn't returned";

/// Rule name used in diagnostics
pub const RULE_NAME: &str = "missing-error";

/// Configuration of the missing-error pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingErrorConfig {
    /// Comma-separated `<package>.<name>` functions that wrap an error
    pub wrappers: String,
}

impl Default for MissingErrorConfig {
    fn default() -> Self {
        Self {
            wrappers: DEFAULT_WRAPPERS.to_string(),
        }
    }
}

/// Lint rule flagging error values that are never returned
#[derive(Debug, Clone, Default)]
pub struct MissingErrorRule {
    config: MissingErrorConfig,
}

impl MissingErrorRule {
    /// Create the rule with an explicit configuration
    #[must_use]
    pub fn new(config: MissingErrorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &MissingErrorConfig {
        &self.config
    }
}

impl LintRule for MissingErrorRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn check_unit(&self, ctx: &mut LintContext) -> LintResult<()> {
        for diagnostic in check(ctx.unit, &self.config.wrappers)? {
            ctx.report(diagnostic);
        }
        Ok(())
    }
}

/// Run the pass over `unit` with the given wrapper list
///
/// # Errors
///
/// Returns [`crate::LintError::InvalidWrapper`] if an entry of `wrappers` is
/// not of the form `<package>.<name>`. Nothing is analyzed in that case.
pub fn check(unit: &Unit, wrappers: &str) -> LintResult<Vec<Diagnostic>> {
    Ok(find_unreturned(unit, wrappers)?
        .into_iter()
        .map(diagnostic)
        .collect())
}

/// Positions of every unreturned error binding, in source order
///
/// # Errors
///
/// Same as [`check`].
#[tracing::instrument(level = "debug", skip_all, fields(package = %unit.package, wrappers = %wrappers))]
pub fn find_unreturned(unit: &Unit, wrappers: &str) -> LintResult<Vec<FileSpan>> {
    let registry = WrapperRegistry::resolve(unit, wrappers)?;
    let named = named_results::collect(unit);

    let mut tracker = Tracker::new(unit, &registry);
    for stmt in unit.statements() {
        match stmt {
            TrackedStmt::Assign(assign) => tracker.visit_assign(assign),
            TrackedStmt::Return(ret) => tracker.visit_return(ret),
        }
    }

    let findings = report::consolidate(tracker.finish(), &named);
    tracing::debug!(findings = findings.len(), "missing-error finished");
    Ok(findings)
}

fn diagnostic(span: FileSpan) -> Diagnostic {
    Diagnostic {
        rule: RULE_NAME.to_string(),
        level: LintLevel::Warning,
        message: MESSAGE.to_string(),
        span,
        suggestion: Some("return the error or wrap it in a returned error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LintError;
    use me_facts::{BinaryOp, ObjId, Stmt, TyId, UnitBuilder};

    /// Builder preloaded with `error`, `fmt.Errorf` and two local producers:
    /// `a() error` and `b() (bool, error)`
    struct Fixture {
        b: UnitBuilder,
        error: TyId,
        errorf: ObjId,
        a: ObjId,
        pair: ObjId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut b = UnitBuilder::new("a");
            let error = b.error_type();
            let boolean = b.bool_type();
            let errorf = b.import_errorf();
            let a = b.extern_func("a", Vec::new(), vec![b.unnamed(error)]);
            let pair = b.extern_func(
                "b",
                Vec::new(),
                vec![b.unnamed(boolean), b.unnamed(error)],
            );
            Self {
                b,
                error,
                errorf,
                a,
                pair,
            }
        }

        /// `name := a()`
        fn define_from_a(&mut self, name: &str) -> (Stmt, ObjId, FileSpan) {
            let (lhs, object) = self.b.define(name, self.error);
            let span = lhs.span;
            let call = self.b.call(self.a, Vec::new());
            (self.b.define_stmt(vec![lhs], vec![call]), object, span)
        }

        /// `name = a()`
        fn assign_from_a(&mut self, object: ObjId) -> (Stmt, FileSpan) {
            let lhs = self.b.var(object);
            let span = lhs.span;
            let call = self.b.call(self.a, Vec::new());
            (self.b.assign_stmt(vec![lhs], vec![call]), span)
        }

        /// `if name != nil { body }`
        fn if_not_nil(&mut self, object: ObjId, body: Vec<Stmt>) -> Stmt {
            let var = self.b.var(object);
            let nil = self.b.nil();
            let cond = self.b.binary(BinaryOp::Ne, var, nil);
            self.b.if_stmt(None, cond, body, None)
        }

        fn return_var(&mut self, object: ObjId) -> Stmt {
            let var = self.b.var(object);
            self.b.return_stmt(vec![var])
        }

        fn run(self, body: Vec<Stmt>) -> Vec<FileSpan> {
            let Self { mut b, error, .. } = self;
            b.func("f", Vec::new(), vec![b.unnamed(error)], body);
            let unit = b.finish();
            find_unreturned(&unit, DEFAULT_WRAPPERS).expect("default wrappers are valid")
        }
    }

    #[test]
    fn test_overwrite_reports_first_binding() {
        let mut fx = Fixture::new();
        let (first, e, first_span) = fx.define_from_a("e");
        let (second, _) = fx.assign_from_a(e);

        // The second binding is still pending at the end and is reported too.
        let findings = fx.run(vec![first, second]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0], first_span);
    }

    #[test]
    fn test_checked_and_returned_is_clean() {
        let mut fx = Fixture::new();
        let (assign, e, _) = fx.define_from_a("e");
        let ret = fx.return_var(e);
        let check = fx.if_not_nil(e, vec![ret]);

        assert!(fx.run(vec![assign, check]).is_empty());
    }

    #[test]
    fn test_wrapped_return_is_clean() {
        let mut fx = Fixture::new();
        let (assign, e, _) = fx.define_from_a("e");
        let format = fx.b.string_lit("wrap: %w");
        let cause = fx.b.var(e);
        let wrapped = fx.b.qualified_call("fmt", fx.errorf, vec![format, cause]);
        let ret = fx.b.return_stmt(vec![wrapped]);
        let check = fx.if_not_nil(e, vec![ret]);

        assert!(fx.run(vec![assign, check]).is_empty());
    }

    #[test]
    fn test_blank_target_reports_immediately() {
        let mut fx = Fixture::new();
        let blank = fx.b.blank();
        let blank_span = blank.span;
        let call = fx.b.call(fx.a, Vec::new());
        let assign = fx.b.assign_stmt(vec![blank], vec![call]);
        let nil = fx.b.nil();
        let ret = fx.b.return_stmt(vec![nil]);

        assert_eq!(fx.run(vec![assign, ret]), vec![blank_span]);
    }

    #[test]
    fn test_overwrite_then_return_reports_only_the_first() {
        let mut fx = Fixture::new();
        let (first, e, first_span) = fx.define_from_a("e");
        let (second, _) = fx.assign_from_a(e);
        let ret = fx.return_var(e);
        let check = fx.if_not_nil(e, vec![ret]);

        assert_eq!(fx.run(vec![first, second, check]), vec![first_span]);
    }

    #[test]
    fn test_blank_in_tuple_assignment_reports_error_position_only() {
        let mut fx = Fixture::new();
        let first = fx.b.blank();
        let second = fx.b.blank();
        let second_span = second.span;
        let call = fx.b.call(fx.pair, Vec::new());
        let assign = fx.b.assign_stmt(vec![first, second], vec![call]);

        assert_eq!(fx.run(vec![assign]), vec![second_span]);
    }

    #[test]
    fn test_malformed_wrapper_aborts() {
        let fx = Fixture::new();
        let unit = fx.b.finish();

        let err = check(&unit, "fmt.Errorf,Wrap").expect_err("entry without package");
        assert_eq!(
            err,
            LintError::InvalidWrapper {
                entry: "Wrap".to_string()
            }
        );
    }

    #[test]
    fn test_rule_reports_warnings_with_fixed_message() {
        let mut fx = Fixture::new();
        let (assign, _, span) = fx.define_from_a("e");
        let Fixture { mut b, error, .. } = fx;
        b.func("f", Vec::new(), vec![b.unnamed(error)], vec![assign]);
        let unit = b.finish();

        let mut ctx = LintContext::new(&unit);
        MissingErrorRule::default()
            .check_unit(&mut ctx)
            .expect("default wrappers are valid");

        let diagnostics = ctx.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, MESSAGE);
        assert_eq!(diagnostics[0].rule, RULE_NAME);
        assert_eq!(diagnostics[0].level, LintLevel::Warning);
        assert_eq!(diagnostics[0].span, span);
    }

    #[test]
    fn test_default_config() {
        let rule = MissingErrorRule::default();
        assert_eq!(rule.config().wrappers, "fmt.Errorf");
        assert_eq!(rule.name(), "missing-error");
    }
}
