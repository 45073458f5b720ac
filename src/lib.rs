pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod repository;
pub mod search;
pub mod storage;

pub use config::Config;
pub use entity::{
    Category, CollectionKind, Document, Entity, Favorite, Link, Note, Resource, ResourceKind, Tag,
};
pub use error::{LinkNestError, Result};
pub use events::RepositoryEvent;
pub use repository::{DocumentImport, LoadState, Repository, Snapshot, Stored};
pub use search::{Filter, SortOrder, TagMatch};
pub use storage::{FileStore, KeyValueStore};
