//! Core module - registry records and the normalization pipeline

pub mod category;
pub mod config;
pub mod entity;
pub mod loader;
pub mod normalize;

pub use category::{
    categorize, CategorizeOptions, CategoryDef, CategoryGroup, CategoryListing, CategoryScheme,
    UnmappedPolicy, UnmappedTypes,
};
pub use config::{Config, ConfigError};
pub use entity::{Entity, RawRow};
pub use loader::{load_rows, read_rows, LoadError};
pub use normalize::{
    normalize, MalformedInput, MalformedPolicy, NormalizeOptions, OrderingMode, TypeIndex,
};
