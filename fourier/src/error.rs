use crate::registry::Family;
use crate::wisdom::Precision;
use thiserror::Error;

/// Errors produced while planning, executing, or persisting transforms.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The transform size is not positive.
    #[error("invalid transform length {0}")]
    InvalidLength(usize),

    /// A required buffer was empty.
    #[error("{which} buffer is empty")]
    NilBuffer { which: &'static str },

    /// A buffer does not match the planned transform size.
    #[error("{which} buffer holds {actual} elements, plan requires {expected}")]
    LengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Neither a codelet nor a decomposition can compute the requested transform.
    #[error(
        "no {} implementation for {size}-point {precision} transforms",
        .family.map_or("auto", Family::name)
    )]
    NotImplemented {
        size: usize,
        precision: Precision,
        family: Option<Family>,
    },

    /// A wisdom record could not be parsed.
    #[error("malformed wisdom record on line {line}: {reason} ({content:?})")]
    ImportFormat {
        line: usize,
        content: String,
        reason: &'static str,
    },

    /// Reading or writing wisdom failed.
    #[error("wisdom I/O failed")]
    Io(#[from] std::io::Error),
}
