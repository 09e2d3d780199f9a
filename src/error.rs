//! Hard failures raised by the analysis engine.
//!
//! Values that are merely undefined at a point (outside a mask, illegal
//! polynomial indices, zero-mass moments) are not errors: scalar results
//! carry `f64::NAN` and structured results are `None`.

use thiserror::Error;

/// Error taxonomy for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A ray could not be intersected with the reference sphere while
    /// correcting its path length.
    #[error("ray misses the reference sphere")]
    MissedReferenceSphere,

    /// Zernike fits are only defined for orders 4, 6 and 8.
    #[error("unsupported Zernike fit order {0} (expected 4, 6 or 8)")]
    UnsupportedFitOrder(u32),

    /// No valid ray in the pencil, so no reference point can be derived.
    #[error("ray pencil has no valid rays")]
    EmptyPencil,

    /// Not enough wave points to determine the requested parameters.
    #[error("fit needs at least {parameters} points, got {points}")]
    TooFewPoints { points: usize, parameters: usize },

    /// The `type:` tag of a wavefront file names no known model.
    #[error("unknown wavefront type `{0}`")]
    UnknownWaveFrontType(String),

    /// A token that should have been a number could not be parsed.
    #[error("line {line}: malformed number `{token}`")]
    MalformedNumber { line: usize, token: String },

    /// A `type:`, `radius:` or `field:` tag without a value.
    #[error("line {line}: tag `{tag}` has no value")]
    MissingTagValue { line: usize, tag: String },

    /// Fixed-size models received the wrong number of coefficients.
    #[error("{kind} wavefront needs {expected} coefficients, found {found}")]
    CoefficientCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
