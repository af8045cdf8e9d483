//! Types and methods for reading and parsing input and writing output.

pub mod detect;
pub mod file;
pub mod tsv;

pub use detect::RegionFile;
pub use file::{InputFile, OutputFile};
pub use tsv::build_tsv_reader;
