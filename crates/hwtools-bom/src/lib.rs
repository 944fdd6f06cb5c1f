use std::path::PathBuf;
use thiserror::Error;

pub mod augment;
pub mod reader;
pub mod writer;

pub use augment::{augment, run, AugmentOptions, AugmentReport, RowOutcome, RunSummary};
pub use reader::read_bom;
pub use writer::{output_path, write_bom};

#[derive(Debug, Error)]
pub enum BomError {
    #[error("failed to read BOM {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write BOM {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
