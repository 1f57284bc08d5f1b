use serde::{Deserialize, Serialize};

/// What to project out of a tree: an optional root path, an include selector
/// and an exclude selector
///
/// Blank strings are treated the same as absent ones. When deserialized, the
/// keys `view`, `select` and `drop` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default, alias = "view", skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    #[serde(default, alias = "select", skip_serializing_if = "Option::is_none")]
    include: Option<String>,
    #[serde(default, alias = "drop", skip_serializing_if = "Option::is_none")]
    exclude: Option<String>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooted(root: impl Into<String>) -> Self {
        Self::new().with_root(root)
    }

    pub fn including(include: impl Into<String>) -> Self {
        Self::new().with_include(include)
    }

    pub fn excluding(exclude: impl Into<String>) -> Self {
        Self::new().with_exclude(exclude)
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn root(&self) -> Option<&str> {
        non_blank(&self.root)
    }

    pub fn include(&self) -> Option<&str> {
        non_blank(&self.include)
    }

    pub fn exclude(&self) -> Option<&str> {
        non_blank(&self.exclude)
    }

    /// True when projecting would return the tree unchanged
    pub fn is_empty(&self) -> bool {
        self.root().is_none() && self.include().is_none() && self.exclude().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let fields = Fields::rooted("[0]").with_include("name").with_exclude("age");
        assert_eq!(fields.root(), Some("[0]"));
        assert_eq!(fields.include(), Some("name"));
        assert_eq!(fields.exclude(), Some("age"));
    }

    #[test]
    fn test_blank_is_absent() {
        let fields = Fields::including("  \n").with_exclude("");
        assert_eq!(fields.include(), None);
        assert_eq!(fields.exclude(), None);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_deserialize_with_aliases() {
        let fields: Fields =
            serde_json::from_value(json!({"view": "[0].account", "select": "username"})).unwrap();
        assert_eq!(fields.root(), Some("[0].account"));
        assert_eq!(fields.include(), Some("username"));
        assert_eq!(fields.exclude(), None);

        let fields: Fields = serde_json::from_value(json!({"exclude": "password"})).unwrap();
        assert_eq!(fields, Fields::excluding("password"));
    }

    #[test]
    fn test_serialize_skips_absent() {
        let value = serde_json::to_value(Fields::including("name")).unwrap();
        assert_eq!(value, json!({"include": "name"}));
    }
}
