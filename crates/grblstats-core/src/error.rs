//! Error handling for GrblStats
//!
//! Version parsing errors for application versions and firmware banners.

use thiserror::Error;

/// Version parsing error type
///
/// Raised when an application version string or a firmware banner
/// cannot be turned into a version value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Input was empty or whitespace only
    #[error("Version string is empty")]
    Empty,

    /// A numeric component could not be parsed
    #[error("Invalid version component '{component}' in '{input}'")]
    InvalidComponent {
        /// The offending component.
        component: String,
        /// The full input.
        input: String,
    },

    /// A required component is missing
    #[error("Missing {name} component in '{input}'")]
    MissingComponent {
        /// Name of the missing component (major, minor, patch).
        name: &'static str,
        /// The full input.
        input: String,
    },

    /// The text does not look like a firmware welcome banner
    #[error("Unrecognised firmware banner: {banner}")]
    UnrecognisedBanner {
        /// The banner text that was rejected.
        banner: String,
    },
}
