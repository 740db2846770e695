//! Group path bookkeeping shared by the readers and writers.

/// Stack of open groups; anonymous items are shown as `[]`.
#[derive(Clone, Debug, Default)]
pub struct GroupPath {
    segments: Vec<String>,
}

impl GroupPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.segments.push(name.to_string());
    }

    pub fn push_item(&mut self) {
        self.segments.push("[]".to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// `/`-joined path, or `(root)` at the top level.
    pub fn label(&self) -> String {
        if self.segments.is_empty() {
            "(root)".to_string()
        } else {
            self.segments.join("/")
        }
    }
}

/// Names must be usable as bare identifiers in every format.
pub(crate) fn check_name(name: &str) -> crate::ArchiveResult<()> {
    if name.is_empty() {
        return Err(crate::ArchiveError::InvalidName {
            name: name.to_string(),
            reason: "names must not be empty",
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(crate::ArchiveError::InvalidName {
            name: name.to_string(),
            reason: "names may contain only ASCII letters, digits and '_'",
        });
    }
    Ok(())
}
