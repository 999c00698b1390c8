//! Version identifiers
//!
//! Two version values are tracked by a usage report: the version of the host
//! application and the version of the firmware running on the attached
//! controller. Both are plain values compared structurally, so a change is
//! detected whenever any component differs.

use crate::error::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application version in `major.minor.patch` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AppVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl AppVersion {
    /// Create a version from its components
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string such as `0.53.0-alpha.0` or `4.9.2`.
    ///
    /// Pre-release and build suffixes are ignored. A missing patch component
    /// reads as zero; a fourth component is dropped.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let core = trimmed.split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.');

        let major = parse_component(parts.next(), "major", input)?;
        let minor = parse_component(parts.next(), "minor", input)?;
        let patch = match parts.next() {
            Some(p) => parse_component(Some(p), "patch", input)?,
            None => 0,
        };

        Ok(Self::new(major, minor, patch))
    }
}

fn parse_component(
    part: Option<&str>,
    name: &'static str,
    input: &str,
) -> Result<u32, VersionError> {
    let part = part
        .filter(|p| !p.is_empty())
        .ok_or_else(|| VersionError::MissingComponent {
            name,
            input: input.to_string(),
        })?;
    part.parse().map_err(|_| VersionError::InvalidComponent {
        component: part.to_string(),
        input: input.to_string(),
    })
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for AppVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Firmware/protocol version reported by a GRBL-style controller
///
/// Rendered as `1.1h`: major, minor and an optional single-letter build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FirmwareVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Build letter (`h` in `1.1h`)
    pub build: Option<char>,
}

impl FirmwareVersion {
    /// Create a version without a build letter
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
        }
    }

    /// Attach a build letter
    pub const fn with_build(mut self, build: char) -> Self {
        self.build = Some(build);
        self
    }

    /// Parse a bare version token such as `1.1h` or `0.9`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (major_str, rest) =
            trimmed
                .split_once('.')
                .ok_or_else(|| VersionError::MissingComponent {
                    name: "minor",
                    input: input.to_string(),
                })?;

        let major = parse_component(Some(major_str), "major", input)?;

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (minor_str, suffix) = rest.split_at(digits_end);
        let minor = parse_component(Some(minor_str), "minor", input)?;

        let mut suffix_chars = suffix.chars();
        let build = match (suffix_chars.next(), suffix_chars.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
            _ => {
                return Err(VersionError::InvalidComponent {
                    component: suffix.to_string(),
                    input: input.to_string(),
                })
            }
        };

        Ok(Self { major, minor, build })
    }

    /// Extract the version from a controller welcome banner,
    /// e.g. `Grbl 1.1h ['$' for help]` or `GrblHAL 1.1f ['$' or '$HELP' for help]`.
    pub fn from_banner(banner: &str) -> Result<Self, VersionError> {
        let mut tokens = banner.split_whitespace();
        let product = tokens.next().unwrap_or_default();
        if !product.to_ascii_lowercase().starts_with("grbl") {
            return Err(VersionError::UnrecognisedBanner {
                banner: banner.trim().to_string(),
            });
        }

        let version = tokens
            .next()
            .ok_or_else(|| VersionError::UnrecognisedBanner {
                banner: banner.trim().to_string(),
            })?;
        Self::parse(version)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.build {
            Some(build) => write!(f, "{}.{}{}", self.major, self.minor, build),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for FirmwareVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_version_parse() {
        assert_eq!(AppVersion::parse("4.9.2").unwrap(), AppVersion::new(4, 9, 2));
        assert_eq!(
            AppVersion::parse("0.53.0-alpha.0").unwrap(),
            AppVersion::new(0, 53, 0)
        );
        assert_eq!(AppVersion::parse("v1.2").unwrap(), AppVersion::new(1, 2, 0));
        assert_eq!(
            AppVersion::parse("5.1.0.17").unwrap(),
            AppVersion::new(5, 1, 0)
        );
    }

    #[test]
    fn test_app_version_parse_errors() {
        assert_eq!(AppVersion::parse("  "), Err(VersionError::Empty));
        assert!(matches!(
            AppVersion::parse("3"),
            Err(VersionError::MissingComponent { name: "minor", .. })
        ));
        assert!(matches!(
            AppVersion::parse("1.x.0"),
            Err(VersionError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_app_version_display_is_three_components() {
        assert_eq!(AppVersion::new(4, 9, 0).to_string(), "4.9.0");
        assert_eq!(AppVersion::default().to_string(), "0.0.0");
    }

    #[test]
    fn test_firmware_version_parse_and_display() {
        let v = FirmwareVersion::parse("1.1h").unwrap();
        assert_eq!(v, FirmwareVersion::new(1, 1).with_build('h'));
        assert_eq!(v.to_string(), "1.1h");

        let v = FirmwareVersion::parse("0.9").unwrap();
        assert_eq!(v, FirmwareVersion::new(0, 9));
        assert_eq!(v.to_string(), "0.9");
    }

    #[test]
    fn test_firmware_version_rejects_garbage() {
        assert!(FirmwareVersion::parse("1").is_err());
        assert!(FirmwareVersion::parse("1.1hh").is_err());
        assert!(FirmwareVersion::parse("a.1").is_err());
    }

    #[test]
    fn test_firmware_version_from_banner() {
        let v = FirmwareVersion::from_banner("Grbl 1.1h ['$' for help]").unwrap();
        assert_eq!(v.to_string(), "1.1h");

        let v = FirmwareVersion::from_banner("GrblHAL 1.1f ['$' or '$HELP' for help]").unwrap();
        assert_eq!(v.build, Some('f'));

        assert!(matches!(
            FirmwareVersion::from_banner("Smoothie ok"),
            Err(VersionError::UnrecognisedBanner { .. })
        ));
    }

    #[test]
    fn test_firmware_version_structural_equality() {
        let a = FirmwareVersion::parse("1.1h").unwrap();
        let b = FirmwareVersion::from_banner("Grbl 1.1h").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, FirmwareVersion::new(1, 1).with_build('g'));
    }
}
