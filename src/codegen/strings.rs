/// Insertion-ordered, dedup-by-value string literal table (§3). Labels
/// are `.LC0, .LC1, …` in first-seen order.
#[derive(Debug, Default)]
pub struct StringTable {
    entries: Vec<(String, String)>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, value: &str) -> String {
        if let Some((_, label)) = self.entries.iter().find(|(v, _)| v == value) {
            return label.clone();
        }
        let label = format!(".LC{}", self.entries.len());
        self.entries.push((value.to_string(), label.clone()));
        label
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
