use crate::hierarchy::DatedHierarchy;

/// What the host asks to show first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialSelection {
    pub edge_key: String,
    pub node_key: String,
    pub date: String,
}

impl InitialSelection {
    pub fn new(edge_key: &str, node_key: &str, date: &str) -> Self {
        Self {
            edge_key: edge_key.to_string(),
            node_key: node_key.to_string(),
            date: date.to_string(),
        }
    }
}

/// Active attribute keys and date, with the date resolved to a run and an index in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub edge_key: String,
    pub node_key: String,
    pub date: String,
    pub run: usize,
    pub date_index: usize,
}

/// Finds the run holding `date` and the date's position in that run.
pub fn locate_date(runs: &[DatedHierarchy], date: &str) -> Option<(usize, usize)> {
    runs.iter()
        .enumerate()
        .find_map(|(run, dated)| dated.date_index(date).map(|index| (run, index)))
}

impl Selection {
    pub fn resolve(initial: InitialSelection, runs: &[DatedHierarchy]) -> Option<Self> {
        let (run, date_index) = locate_date(runs, &initial.date)?;
        Some(Self {
            edge_key: initial.edge_key,
            node_key: initial.node_key,
            date: initial.date,
            run,
            date_index,
        })
    }

    pub fn move_to(&mut self, date: &str, run: usize, date_index: usize) {
        self.date = date.to_string();
        self.run = run;
        self.date_index = date_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Hierarchy;
    use crate::hierarchy::tests::node;

    fn runs() -> Vec<DatedHierarchy> {
        vec![
            DatedHierarchy {
                dates: vec!["2020-01-01".into(), "2020-02-01".into()],
                tree: Hierarchy::from_tree(&node("R", vec![])),
            },
            DatedHierarchy {
                dates: vec!["2020-03-01".into()],
                tree: Hierarchy::from_tree(&node("R", vec![node("W", vec![])])),
            },
        ]
    }

    #[test]
    fn locates_run_and_index() {
        let runs = runs();
        assert_eq!(locate_date(&runs, "2020-02-01"), Some((0, 1)));
        assert_eq!(locate_date(&runs, "2020-03-01"), Some((1, 0)));
        assert_eq!(locate_date(&runs, "1999-01-01"), None);
    }

    #[test]
    fn resolve_rejects_unknown_date() {
        let runs = runs();
        assert!(Selection::resolve(InitialSelection::new("a", "b", "nope"), &runs).is_none());
        let selection =
            Selection::resolve(InitialSelection::new("a", "b", "2020-03-01"), &runs).unwrap();
        assert_eq!((selection.run, selection.date_index), (1, 0));
    }
}
