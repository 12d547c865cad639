//! Unified error type for meshterm.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for on-target logging when the feature is on.

use core::fmt;

use crate::radio::RadioField;

/// Top-level error type used across the UI core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Mesh engine
    /// The mesh engine rejected or failed an operation.
    Mesh(MeshError),

    // Storage
    /// The settings store could not be read or written.
    Storage(StoreError),

    // Display
    /// Drawing to the display surface failed.
    Display,

    // Generic
    /// Text did not fit into its bounded buffer.
    BufferOverflow,

    /// A radio parameter failed validation.
    InvalidParameter(RadioField),
}

/// Failures reported by the mesh engine collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeshError {
    /// The outbound queue is full.
    QueueFull,
    /// The contact or channel no longer exists.
    UnknownTarget,
    /// Preferences could not be written.
    PersistFailed,
    /// Engine-specific error code.
    Raw(u32),
}

/// Failures reported by the settings store collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The namespace could not be opened.
    Unavailable,
    /// No room left for another key.
    Full,
    /// Underlying flash read/write/erase failed.
    Flash,
}

// Convenience conversions

impl From<MeshError> for Error {
    fn from(e: MeshError) -> Self {
        Error::Mesh(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Storage(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Mesh(e) => write!(f, "mesh: {e}"),
            Error::Storage(e) => write!(f, "storage: {e}"),
            Error::Display => f.write_str("display error"),
            Error::BufferOverflow => f.write_str("buffer overflow"),
            Error::InvalidParameter(field) => write!(f, "{}", field.invalid_message()),
        }
    }
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::QueueFull => f.write_str("queue full"),
            MeshError::UnknownTarget => f.write_str("unknown target"),
            MeshError::PersistFailed => f.write_str("persist failed"),
            MeshError::Raw(code) => write!(f, "code {code}"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => f.write_str("unavailable"),
            StoreError::Full => f.write_str("full"),
            StoreError::Flash => f.write_str("flash error"),
        }
    }
}
