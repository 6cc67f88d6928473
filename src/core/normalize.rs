//! Type normalization: fan multi-valued `Type` fields out into one
//! association per label and group the associations by label.

use clap::ValueEnum;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::entity::{Entity, RawRow};

/// Order of associations within a type group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    /// Every row's primary type first, then every row's extra types.
    /// Matches previously published renders.
    #[default]
    TwoPhase,
    /// Rows in input order, each row's labels in the order they are listed
    PerRow,
}

/// What to do with a row whose `Type` field cannot be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Drop the row and log a warning
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub ordering: OrderingMode,
    pub on_malformed: MalformedPolicy,
}

/// A row whose `Type` field is present but unusable
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("malformed Type field on line {line}: {reason}")]
#[diagnostic(
    code(drd::input::malformed),
    help("the Type column must hold comma-separated labels such as \"Organization, Team\"; use --on-malformed skip to drop such rows")
)]
pub struct MalformedInput {
    pub line: u64,
    pub reason: String,
}

impl MalformedInput {
    pub fn new(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Entities grouped by raw type label
///
/// Labels iterate in sorted order. Within a label, entities keep the
/// order in which their associations were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeIndex {
    groups: BTreeMap<String, Vec<Entity>>,
}

impl TypeIndex {
    pub fn get(&self, label: &str) -> Option<&[Entity]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.groups.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Entity])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of associations across all labels
    pub fn association_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    fn push(&mut self, label: String, entity: Entity) {
        self.groups.entry(label).or_default().push(entity);
    }
}

/// Split a `Type` field into trimmed, non-empty labels
pub fn split_types(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the type index from raw rows.
///
/// Rows missing a name or a type list are dropped without reporting.
/// A row with `N` labels yields `N` associations of the same entity.
pub fn normalize<I>(rows: I, options: &NormalizeOptions) -> Result<TypeIndex, MalformedInput>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut primary: Vec<(String, Entity)> = Vec::new();
    let mut extra: Vec<(String, Entity)> = Vec::new();
    let mut dropped = 0usize;

    for row in rows {
        let Some((name, types)) = row.required_fields() else {
            debug!(line = row.line, "dropping incomplete row");
            dropped += 1;
            continue;
        };

        let labels = split_types(types);
        if labels.is_empty() {
            let err = MalformedInput::new(row.line, format!("{types:?} contains no type labels"));
            match options.on_malformed {
                MalformedPolicy::Abort => return Err(err),
                MalformedPolicy::Skip => {
                    warn!(line = row.line, "{}; skipping row", err.reason);
                    continue;
                }
            }
        }

        let entity = Entity::new(name, row.url.as_deref());
        let mut labels = labels.into_iter();
        if let Some(first) = labels.next() {
            primary.push((first, entity.clone()));
        }
        let rest = labels.map(|label| (label, entity.clone()));
        match options.ordering {
            OrderingMode::TwoPhase => extra.extend(rest),
            OrderingMode::PerRow => primary.extend(rest),
        }
    }

    let mut index = TypeIndex::default();
    for (label, entity) in primary.into_iter().chain(extra) {
        index.push(label, entity);
    }

    debug!(
        types = index.len(),
        associations = index.association_count(),
        dropped,
        "normalized registry rows"
    );
    Ok(index)
}
