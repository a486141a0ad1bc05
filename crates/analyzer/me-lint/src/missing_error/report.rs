use super::tracker::Outcome;
use me_facts::DeclSite;
use me_span::FileSpan;
use rustc_hash::FxHashSet;

/// Merge what the tracker escalated with what it left pending
///
/// Pending bindings of a named result are dropped. The result is in source
/// order.
pub(crate) fn consolidate(outcome: Outcome, named: &FxHashSet<DeclSite>) -> Vec<FileSpan> {
    let Outcome {
        pending,
        mut escalated,
    } = outcome;

    escalated.extend(
        pending
            .into_iter()
            .filter(|(site, _)| !named.contains(site))
            .map(|(_, occurrence)| occurrence),
    );
    escalated.sort_unstable();
    escalated
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_span::{FileId, Span};
    use rustc_hash::FxHashMap;

    fn at(file: u32, start: u32) -> FileSpan {
        FileSpan::new(FileId(file), Span::new(start, start + 1))
    }

    #[test]
    fn test_sorted_and_named_results_exempt() {
        let named_site = DeclSite(at(0, 2));
        let mut pending = FxHashMap::default();
        pending.insert(DeclSite(at(0, 0)), at(0, 40));
        pending.insert(named_site, at(0, 30));

        let outcome = Outcome {
            pending,
            escalated: vec![at(1, 5), at(0, 20)],
        };
        let named = FxHashSet::from_iter([named_site]);

        assert_eq!(
            consolidate(outcome, &named),
            vec![at(0, 20), at(0, 40), at(1, 5)]
        );
    }
}
