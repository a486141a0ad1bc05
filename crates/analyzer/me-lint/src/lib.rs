//! Lint rule engine for compilation units
//!
//! Rules run once per [`Unit`] and report [`Diagnostic`]s into a shared
//! [`LintContext`]. The built-in rule is [`MissingErrorRule`], which flags
//! error values that never leave the function that produced them.

pub mod error;
pub mod missing_error;

pub use error::{LintError, LintResult};
pub use missing_error::{MissingErrorConfig, MissingErrorRule};

use me_facts::Unit;
use me_span::FileSpan;
use serde::{Deserialize, Serialize};

/// Lint severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LintLevel {
    /// Informational message
    Info,
    /// Warning that should be addressed
    Warning,
    /// Error that must be fixed
    Error,
}

/// A lint diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Lint rule that triggered this diagnostic
    pub rule: String,
    /// Severity level
    pub level: LintLevel,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub span: FileSpan,
    /// Optional suggestion for fixing
    pub suggestion: Option<String>,
}

/// Lint context for running rules
pub struct LintContext<'a> {
    /// Unit being linted
    pub unit: &'a Unit,
    /// Collected diagnostics
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LintContext<'a> {
    /// Create a new lint context
    #[must_use]
    pub fn new(unit: &'a Unit) -> Self {
        Self {
            unit,
            diagnostics: Vec::new(),
        }
    }

    /// Report a diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Take all diagnostics
    #[must_use]
    pub fn take_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Trait for lint rules
pub trait LintRule {
    /// Rule name
    fn name(&self) -> &str;

    /// Check a unit
    ///
    /// # Errors
    ///
    /// Returns an error when the rule's configuration cannot be applied to
    /// the unit. Nothing is reported for the unit in that case.
    fn check_unit(&self, ctx: &mut LintContext) -> LintResult<()>;
}

/// Linter with a collection of rules
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
}

impl Linter {
    /// Create a new linter with default rules
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(vec![Box::new(MissingErrorRule::default())])
    }

    /// Create a linter with specific rules
    #[must_use]
    pub fn with_rules(rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { rules }
    }

    /// Lint a unit
    ///
    /// # Errors
    ///
    /// Returns the first rule configuration error; the unit's diagnostics are
    /// discarded in that case.
    pub fn lint_unit(&self, unit: &Unit) -> LintResult<Vec<Diagnostic>> {
        let mut ctx = LintContext::new(unit);

        for rule in &self.rules {
            rule.check_unit(&mut ctx)?;
        }

        Ok(ctx.take_diagnostics())
    }

    /// Add a rule
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Names of the configured rules
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name())
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_facts::UnitBuilder;

    struct CountingRule;

    impl LintRule for CountingRule {
        fn name(&self) -> &str {
            "counting"
        }

        fn check_unit(&self, ctx: &mut LintContext) -> LintResult<()> {
            let count = ctx.unit.func_decls().count();
            if let Some(decl) = ctx.unit.func_decls().next() {
                ctx.report(Diagnostic {
                    rule: self.name().to_string(),
                    level: LintLevel::Info,
                    message: format!("{count} functions"),
                    span: decl.span,
                    suggestion: None,
                });
            }
            Ok(())
        }
    }

    fn unit_with_unreturned_error() -> Unit {
        let mut b = UnitBuilder::new("a");
        let error = b.error_type();
        let produce = b.extern_func("a", Vec::new(), vec![b.unnamed(error)]);
        let (err, _) = b.define("err", error);
        let call = b.call(produce, Vec::new());
        let assign = b.define_stmt(vec![err], vec![call]);
        b.func("f", Vec::new(), Vec::new(), vec![assign]);
        b.finish()
    }

    #[test]
    fn test_default_linter_runs_missing_error() {
        let unit = unit_with_unreturned_error();

        let linter = Linter::new();
        let diagnostics = linter.lint_unit(&unit).expect("default config is valid");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, "missing-error");
        assert_eq!(diagnostics[0].level, LintLevel::Warning);
        assert_eq!(linter.rule_names().collect::<Vec<_>>(), vec!["missing-error"]);
    }

    #[test]
    fn test_linter_with_extra_rule() {
        let unit = unit_with_unreturned_error();

        let mut linter = Linter::with_rules(Vec::new());
        linter.add_rule(Box::new(CountingRule));
        let diagnostics = linter.lint_unit(&unit).expect("no config to fail");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "2 functions");
    }

    #[test]
    fn test_config_error_aborts_unit() {
        let unit = unit_with_unreturned_error();

        let linter = Linter::with_rules(vec![
            Box::new(CountingRule),
            Box::new(MissingErrorRule::new(MissingErrorConfig {
                wrappers: "Errorf".to_string(),
            })),
        ]);

        let err = linter.lint_unit(&unit).expect_err("malformed wrapper");
        assert!(matches!(err, LintError::InvalidWrapper { .. }));
    }
}
