//! Error types emitted by the roadnet CLI.

use thiserror::Error;

use roadnet_data::{DumpError, VendorError};

/// Errors emitted by the roadnet CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Loading or writing a text dump failed.
    #[error(transparent)]
    Dump(#[from] DumpError),
    /// Converting a vendor export failed.
    #[error(transparent)]
    Vendor(#[from] VendorError),
}
