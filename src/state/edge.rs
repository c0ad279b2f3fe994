use std::fmt;

/// A directed link: `parent` links to `title`
///
/// Anchor pages (the start and end of a race) carry an empty parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub title: String,
    pub parent: String,
}

impl Edge {
    pub fn new(title: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            parent: parent.into(),
        }
    }

    /// Creates the root edge for an anchor page
    pub fn root(title: impl Into<String>) -> Self {
        Self::new(title, "")
    }

    /// Returns true if this edge marks an anchor page
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} -> {}", self.parent, self.title)
        }
    }
}
