//! OpenITI Metadata Core Library
//!
//! Walks a corpus of Arabic-script texts, reads the sidecar records next to
//! every author, book and version folder, decides which version of each book
//! is primary and writes the aggregated metadata tables.
//!
//! All file access goes through [`FileSystem`].

pub mod aggregate;
pub mod config;
pub mod counter;
pub mod error;
pub mod extract;
pub mod geo;
pub mod header;
pub mod issues;
pub mod output;
pub mod placeholder;
pub mod record;
pub mod relations;
pub mod row;
pub mod split;
pub mod status;
pub mod tags;
pub mod translit;
pub mod uri;
pub mod vfs;

pub use aggregate::{aggregate, Aggregation, Resources, RunReport};
pub use config::MetadataConfig;
pub use error::{MetaError, Result};
pub use output::ArtifactWriter;
pub use record::Record;
pub use row::MetadataRow;
pub use status::Status;
pub use uri::{Extension, Layout, Uri, UriKind};
pub use vfs::{FileSystem, PhysicalFileSystem};
