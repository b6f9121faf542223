//! Types describing what a secondary-architecture build must produce.
//!
//! This module holds the data the resolver works with: build targets, the
//! fixed file layout per binary format, command-line selections, and the
//! resulting output matrix.

mod layout;
mod output;
mod selection;
mod target;

pub use layout::{BinaryFormat, artifact_file_name, artifact_path, qualified_file_name};
pub use output::{ArchOutputs, Output, OutputMatrix};
pub use selection::{
    AssetsMode, CompatMode, CompatSelection, ComponentSelection, parse_token_list,
};
pub use target::Target;
