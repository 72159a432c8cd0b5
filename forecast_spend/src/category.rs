//! Category classes that drive the category-specific policies

use std::fmt;

/// Class a category name falls into for estimation purposes.
///
/// Matching is case-insensitive on the whole name; anything unrecognised is
/// [`CategoryKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Bills,
    Education,
    Food,
    Transport,
    Shopping,
    Entertainment,
    Other,
}

impl CategoryKind {
    /// Classify a category name
    pub fn classify(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "bills" => CategoryKind::Bills,
            "education" => CategoryKind::Education,
            "food" => CategoryKind::Food,
            "transport" => CategoryKind::Transport,
            "shopping" => CategoryKind::Shopping,
            "entertainment" => CategoryKind::Entertainment,
            _ => CategoryKind::Other,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Bills => "bills",
            CategoryKind::Education => "education",
            CategoryKind::Food => "food",
            CategoryKind::Transport => "transport",
            CategoryKind::Shopping => "shopping",
            CategoryKind::Entertainment => "entertainment",
            CategoryKind::Other => "other",
        };
        f.write_str(label)
    }
}
