/// Ordered class names indexed by classifier output position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: &'static [&'static str],
}

impl LabelTable {
    pub const GENDER: LabelTable = LabelTable::new(&["Male", "Female"]);

    pub const AGE: LabelTable = LabelTable::new(&[
        "(0-2)", "(4-6)", "(8-12)", "(15-20)", "(25-32)", "(38-43)", "(48-53)", "(60-100)",
    ]);

    pub const fn new(labels: &'static [&'static str]) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static str> {
        self.labels.get(index).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| *l == label)
    }
}
