//! Category mapping: fold raw type groups into display categories

use clap::ValueEnum;
use miette::Diagnostic;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::core::entity::Entity;
use crate::core::normalize::TypeIndex;

/// Label used for the catch-all category when unmapped types are collected
pub const DEFAULT_OTHER_LABEL: &str = "Other";

/// One display category and the type labels it gathers, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub types: Vec<String>,
}

/// Immutable mapping from display category to type labels
///
/// Category order and the order of labels inside a category are both
/// significant: they decide the order of the rendered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryScheme {
    categories: Vec<CategoryDef>,
}

impl CategoryScheme {
    /// An empty scheme; add categories with [`CategoryScheme::with_category`]
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Build a scheme from definitions, merging repeated category names
    pub fn new(defs: impl IntoIterator<Item = CategoryDef>) -> Self {
        defs.into_iter()
            .fold(Self::empty(), |scheme, def| scheme.with_category(def.name, def.types))
    }

    /// Add a category, or extend it if a category with that name exists
    ///
    /// A category's types form a set: a label it already gathers is skipped,
    /// so the first mention fixes the label's position.
    pub fn with_category<N, T, S>(mut self, name: N, types: T) -> Self
    where
        N: Into<String>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(CategoryDef {
                    name,
                    types: Vec::new(),
                });
                self.categories.len() - 1
            }
        };

        let labels = &mut self.categories[index].types;
        for label in types.into_iter().map(Into::into) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        self
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    /// True if some category gathers this type label
    pub fn is_mapped(&self, label: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.types.iter().any(|t| t == label))
    }
}

impl<'de> Deserialize<'de> for CategoryScheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<CategoryDef>::deserialize(deserializer).map(Self::new)
    }
}

impl Default for CategoryScheme {
    /// The Data Resource Directory's published categories
    fn default() -> Self {
        Self::empty()
            .with_category("Project/Initiative", ["Project/Initiative"])
            .with_category("Policy Instrument", ["Policy Instrument"])
            .with_category(
                "Learning Resources",
                ["Data Glossary", "Learning Resource", "Working Document"],
            )
            .with_category("Organizations and Teams", ["Organization", "Team"])
            .with_category("Communities", ["Working Group", "Committee", "Community"])
    }
}

/// Handling of type labels that no category gathers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmappedPolicy {
    /// Leave their entities out of the listing
    #[default]
    Drop,
    /// Collect their entities into a trailing catch-all category
    Other,
    /// Refuse to produce a listing
    Error,
}

#[derive(Debug, Clone)]
pub struct CategorizeOptions {
    pub unmapped: UnmappedPolicy,
    pub other_label: String,
}

impl Default for CategorizeOptions {
    fn default() -> Self {
        Self {
            unmapped: UnmappedPolicy::default(),
            other_label: DEFAULT_OTHER_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("type labels not assigned to any category: {}", .types.join(", "))]
#[diagnostic(
    code(drd::category::unmapped),
    help("add the labels to a category in drd.yaml, or pass --unmapped drop or --unmapped other")
)]
pub struct UnmappedTypes {
    pub types: Vec<String>,
}

/// A display category with its entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub entities: Vec<Entity>,
}

impl CategoryGroup {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: Vec::new(),
        }
    }
}

/// Final category → entities mapping, in scheme order
///
/// Serializes as an ordered map from category name to entity list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListing {
    groups: Vec<CategoryGroup>,
}

impl CategoryListing {
    pub fn get(&self, category: &str) -> Option<&[Entity]> {
        self.groups
            .iter()
            .find(|g| g.name == category)
            .map(|g| g.entities.as_slice())
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }
}

impl Serialize for CategoryListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, &group.entities)?;
        }
        map.end()
    }
}

/// Fold type groups into the scheme's categories.
///
/// Every scheme category is present in the result, possibly empty. Labels
/// missing from `by_type` contribute nothing. Labels no category gathers
/// are handled by `options.unmapped`.
pub fn categorize(
    by_type: &TypeIndex,
    scheme: &CategoryScheme,
    options: &CategorizeOptions,
) -> Result<CategoryListing, UnmappedTypes> {
    let mut groups: Vec<CategoryGroup> = scheme
        .categories()
        .iter()
        .map(|def| CategoryGroup::empty(&def.name))
        .collect();

    for (group, def) in groups.iter_mut().zip(scheme.categories()) {
        for label in &def.types {
            if let Some(entities) = by_type.get(label) {
                group.entities.extend_from_slice(entities);
            }
        }
    }

    let unmapped: Vec<&str> = by_type.labels().filter(|l| !scheme.is_mapped(l)).collect();
    if !unmapped.is_empty() {
        match options.unmapped {
            UnmappedPolicy::Drop => {
                debug!(types = ?unmapped, "dropping entities of unmapped types");
            }
            UnmappedPolicy::Error => {
                return Err(UnmappedTypes {
                    types: unmapped.iter().map(|l| l.to_string()).collect(),
                });
            }
            UnmappedPolicy::Other => {
                let idx = match groups.iter().position(|g| g.name == options.other_label) {
                    Some(idx) => idx,
                    None => {
                        groups.push(CategoryGroup::empty(&options.other_label));
                        groups.len() - 1
                    }
                };
                for label in &unmapped {
                    if let Some(entities) = by_type.get(label) {
                        groups[idx].entities.extend_from_slice(entities);
                    }
                }
            }
        }
    }

    Ok(CategoryListing { groups })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::RawRow;
    use crate::core::normalize::{normalize, NormalizeOptions};

    fn index(rows: Vec<RawRow>) -> TypeIndex {
        normalize(rows, &NormalizeOptions::default()).unwrap()
    }

    fn small_scheme() -> CategoryScheme {
        CategoryScheme::empty()
            .with_category("Organizations and Teams", ["Organization", "Team"])
            .with_category("Learning Resources", ["Data Glossary"])
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_alpha_beta_scenario() {
        let by_type = index(vec![
            RawRow::new("Alpha Team", "Organization, Team").with_url("https://x.test"),
            RawRow::new("Beta Glossary", "Data Glossary").with_url(""),
        ]);
        let listing =
            categorize(&by_type, &small_scheme(), &CategorizeOptions::default()).unwrap();

        let alpha = Entity::new("Alpha Team", Some("https://x.test"));
        assert_eq!(
            listing.get("Organizations and Teams").unwrap(),
            &[alpha.clone(), alpha]
        );
        assert_eq!(
            listing.get("Learning Resources").unwrap(),
            &[Entity::new("Beta Glossary", None)]
        );
        assert_eq!(
            listing.names().collect::<Vec<_>>(),
            vec!["Organizations and Teams", "Learning Resources"]
        );
    }

    #[test]
    fn test_every_category_present_even_when_empty() {
        let listing = categorize(
            &TypeIndex::default(),
            &CategoryScheme::default(),
            &CategorizeOptions::default(),
        )
        .unwrap();

        assert_eq!(listing.len(), 5);
        assert!(listing.groups().iter().all(|g| g.entities.is_empty()));
    }

    #[test]
    fn test_types_concatenate_in_declared_order() {
        let by_type = index(vec![
            RawRow::new("Org One", "Organization"),
            RawRow::new("Team One", "Team"),
            RawRow::new("Org Two", "Organization"),
        ]);
        let scheme = CategoryScheme::empty().with_category("Both", ["Team", "Organization"]);
        let listing = categorize(&by_type, &scheme, &CategorizeOptions::default()).unwrap();

        assert_eq!(
            names(listing.get("Both").unwrap()),
            vec!["Team One", "Org One", "Org Two"]
        );
    }

    #[test]
    fn test_unmapped_types_dropped_by_default() {
        let by_type = index(vec![
            RawRow::new("Mapped", "Team"),
            RawRow::new("Orphan", "Dataset"),
        ]);
        let listing =
            categorize(&by_type, &small_scheme(), &CategorizeOptions::default()).unwrap();

        assert_eq!(listing.entity_count(), 1);
        assert!(listing
            .groups()
            .iter()
            .flat_map(|g| &g.entities)
            .all(|e| e.name != "Orphan"));
    }

    #[test]
    fn test_entity_kept_if_any_label_is_mapped() {
        let by_type = index(vec![RawRow::new("Mixed", "Dataset, Team")]);
        let listing =
            categorize(&by_type, &small_scheme(), &CategorizeOptions::default()).unwrap();

        assert_eq!(
            names(listing.get("Organizations and Teams").unwrap()),
            vec!["Mixed"]
        );
    }

    #[test]
    fn test_unmapped_types_collected_into_other() {
        let by_type = index(vec![
            RawRow::new("Orphan B", "Zine"),
            RawRow::new("Orphan A", "Dataset"),
            RawRow::new("Mapped", "Team"),
        ]);
        let options = CategorizeOptions {
            unmapped: UnmappedPolicy::Other,
            ..CategorizeOptions::default()
        };
        let listing = categorize(&by_type, &small_scheme(), &options).unwrap();

        assert_eq!(listing.names().last(), Some("Other"));
        assert_eq!(
            names(listing.get("Other").unwrap()),
            vec!["Orphan A", "Orphan B"]
        );
    }

    #[test]
    fn test_other_reuses_declared_category() {
        let by_type = index(vec![RawRow::new("Orphan", "Dataset")]);
        let scheme = small_scheme().with_category("Misc", ["Widget"]);
        let options = CategorizeOptions {
            unmapped: UnmappedPolicy::Other,
            other_label: "Misc".to_string(),
        };
        let listing = categorize(&by_type, &scheme, &options).unwrap();

        assert_eq!(listing.len(), 3);
        assert_eq!(names(listing.get("Misc").unwrap()), vec!["Orphan"]);
    }

    #[test]
    fn test_unmapped_types_rejected_on_error_policy() {
        let by_type = index(vec![
            RawRow::new("Orphan", "Zine, Dataset"),
            RawRow::new("Mapped", "Team"),
        ]);
        let options = CategorizeOptions {
            unmapped: UnmappedPolicy::Error,
            ..CategorizeOptions::default()
        };
        let err = categorize(&by_type, &small_scheme(), &options).unwrap_err();

        assert_eq!(err.types, vec!["Dataset", "Zine"]);
        assert!(err.to_string().contains("Dataset, Zine"));
    }

    #[test]
    fn test_scheme_merges_repeated_categories() {
        let scheme = CategoryScheme::new(vec![
            CategoryDef {
                name: "A".to_string(),
                types: vec!["X".to_string()],
            },
            CategoryDef {
                name: "A".to_string(),
                types: vec!["Y".to_string()],
            },
        ]);

        assert_eq!(scheme.categories().len(), 1);
        assert!(scheme.is_mapped("Y"));
    }

    #[test]
    fn test_repeated_type_labels_collapse() {
        let scheme = CategoryScheme::empty()
            .with_category("People", ["Team", "Team"])
            .with_category("People", ["Team"]);
        assert_eq!(scheme.categories().len(), 1);
        assert_eq!(scheme.categories()[0].types, vec!["Team".to_string()]);

        let listing = categorize(
            &index(vec![RawRow::new("Solo", "Team")]),
            &scheme,
            &CategorizeOptions::default(),
        )
        .unwrap();
        assert_eq!(names(listing.get("People").unwrap()), vec!["Solo"]);
    }

    #[test]
    fn test_deserialized_scheme_merges_and_collapses() {
        let scheme: CategoryScheme = serde_json::from_str(
            r#"[{"name": "A", "types": ["X", "X"]}, {"name": "A", "types": ["Y", "X"]}]"#,
        )
        .unwrap();
        assert_eq!(scheme.categories().len(), 1);
        assert_eq!(scheme.categories()[0].types, vec!["X", "Y"]);
    }

    #[test]
    fn test_merged_category_keeps_first_label_order() {
        let scheme = CategoryScheme::empty()
            .with_category("A", ["X", "Y"])
            .with_category("A", ["Y", "Z", "X"]);
        assert_eq!(scheme.categories()[0].types, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_listing_serializes_in_scheme_order() {
        let listing = categorize(
            &TypeIndex::default(),
            &small_scheme(),
            &CategorizeOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_string(&listing).unwrap();

        assert_eq!(
            json,
            r#"{"Organizations and Teams":[],"Learning Resources":[]}"#
        );
    }
}
