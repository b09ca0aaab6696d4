use regex::Regex;

use crate::error::FilterError;

/// Selects which incidents, by name, the pipeline cares about.
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// Name must equal the value exactly.
    Exact(String),
    /// Name must match the regular expression somewhere. Anchor the pattern
    /// with `^...$` for a full match.
    Pattern(Regex),
}

impl NameFilter {
    /// Build an exact-match filter.
    pub fn exact(name: impl Into<String>) -> Result<Self, FilterError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FilterError::Empty);
        }
        Ok(Self::Exact(name))
    }

    /// Build a regular-expression filter.
    pub fn pattern(pattern: &str) -> Result<Self, FilterError> {
        if pattern.is_empty() {
            return Err(FilterError::Empty);
        }
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Whether an incident called `name` passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == name,
            Self::Pattern(re) => re.is_match(name),
        }
    }

    /// The configured value, for logging.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(name) => name,
            Self::Pattern(re) => re.as_str(),
        }
    }
}
