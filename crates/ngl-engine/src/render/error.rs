use thiserror::Error;

use crate::device::GlError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaoError {
    /// Data uploads go through the bound VAO; bind it first.
    #[error("vertex array {0} is not bound")]
    NotBound(&'static str),

    #[error(transparent)]
    Gl(#[from] GlError),
}
