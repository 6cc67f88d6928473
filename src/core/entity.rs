//! Registry records: raw CSV rows and the normalized entities built from them

use serde::Serialize;

/// Column holding the entity's display name
pub const NAME_COLUMN: &str = "Entity Full Name";

/// Column holding the comma-separated type labels
pub const TYPE_COLUMN: &str = "Type";

/// Column holding the optional entity URL
pub const URL_COLUMN: &str = "URL";

/// One record as read from the registry, before any cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line of the record in its source (0 when built in memory)
    pub line: u64,
    pub name: Option<String>,
    pub types: Option<String>,
    pub url: Option<String>,
}

impl RawRow {
    pub fn new(name: impl Into<String>, types: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            types: Some(types.into()),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    /// Name and type list, when both are present and not blank
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let name = self.name.as_deref().filter(|v| !v.trim().is_empty())?;
        let types = self.types.as_deref().filter(|v| !v.trim().is_empty())?;
        Some((name, types))
    }

    pub fn is_complete(&self) -> bool {
        self.required_fields().is_some()
    }
}

/// A named registry entry as handed to templates
///
/// Never mutated after construction. A blank URL is always `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Entity {
    pub name: String,
    pub url: Option<String>,
}

impl Entity {
    /// Build an entity, trimming the name and collapsing a blank URL to `None`
    pub fn new(name: &str, url: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            url: url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_trims_name() {
        let entity = Entity::new("  Alpha Team \t", None);
        assert_eq!(entity.name, "Alpha Team");
    }

    #[test]
    fn test_entity_blank_url_is_none() {
        assert_eq!(Entity::new("A", Some("")).url, None);
        assert_eq!(Entity::new("A", Some("   ")).url, None);
        assert_eq!(Entity::new("A", None).url, None);
    }

    #[test]
    fn test_entity_url_is_trimmed() {
        let entity = Entity::new("A", Some(" https://x.test "));
        assert_eq!(entity.url.as_deref(), Some("https://x.test"));
    }

    #[test]
    fn test_entity_serializes_null_url() {
        let json = serde_json::to_string(&Entity::new("Beta", None)).unwrap();
        assert_eq!(json, r#"{"name":"Beta","url":null}"#);
    }

    #[test]
    fn test_raw_row_completeness() {
        assert!(RawRow::new("A", "Team").is_complete());
        assert!(!RawRow::new("A", "  ").is_complete());
        assert!(!RawRow::new("", "Team").is_complete());

        let missing_type = RawRow {
            name: Some("A".to_string()),
            ..RawRow::default()
        };
        assert!(!missing_type.is_complete());
    }
}
