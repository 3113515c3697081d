/// Identifies which logical column (and sub path) an iterator serves.
///
/// Only used to attribute statistics, e.g. `"payload.user.id"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAccessPath {
    segments: Vec<String>,
}

impl ColumnAccessPath {
    pub fn new(column: &str) -> Self {
        Self { segments: vec![column.to_string()] }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn path(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn absolute_path(&self) -> String {
        self.segments.join(".")
    }
}
