//! Junction database files: the persisted genes, junctions and gene stats of
//! one classified result file.

mod binary_io;
mod common_header;
pub mod export;
pub mod reader;
pub mod writer;

pub use reader::JunctionDb;
pub use writer::JunctionDbWriter;
