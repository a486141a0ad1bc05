//! Named error results
//!
//! A bare `return` hands back named results without naming them, so their
//! declaration sites are exempt from the final report.

use me_facts::{DeclSite, Unit};
use rustc_hash::FxHashSet;

/// Declaration sites of every error-typed named result in `unit`
pub(crate) fn collect(unit: &Unit) -> FxHashSet<DeclSite> {
    let mut sites = FxHashSet::default();

    for decl in unit.func_decls() {
        for (ident, declared) in decl.named_results() {
            let (site, ty) = match unit.object_of(ident) {
                Some(object) => (object.decl, object.ty),
                None => (DeclSite(ident.span), declared),
            };
            if unit.implements_error(ty) {
                sites.insert(site);
            }
        }
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_facts::UnitBuilder;

    #[test]
    fn test_only_error_named_results_are_collected() {
        let mut b = UnitBuilder::new("a");
        let error = b.error_type();
        let int = b.int_type();

        let (count, _) = b.named_result("n", int);
        let (err, err_obj) = b.named_result("err", error);
        b.func("f", Vec::new(), vec![count, err], Vec::new());
        b.func("g", Vec::new(), vec![b.unnamed(error)], Vec::new());
        b.extern_func("h", Vec::new(), Vec::new());
        let unit = b.finish();

        let sites = collect(&unit);
        let expected = unit.object(err_obj).map(|object| object.decl);
        assert_eq!(sites.len(), 1);
        assert!(expected.is_some_and(|site| sites.contains(&site)));
    }
}
