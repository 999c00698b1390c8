//! Host environment probes
//!
//! Small, side-effect free queries about the machine the application runs on:
//! locale identifiers, an OS descriptor and the process/OS bit-width flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Windows-style locale identifier (LCID)
///
/// Reports carry the numeric identifier rather than a BCP-47 tag so that
/// figures stay comparable with data collected by older releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocaleId(pub u32);

impl LocaleId {
    /// The invariant culture, used for unknown tags
    pub const INVARIANT: LocaleId = LocaleId(0x007F);

    /// Map a locale tag (`en-US`, `it_IT.UTF-8`, `de`) to its identifier.
    ///
    /// Tags without a regional entry fall back to the neutral language
    /// identifier; unknown languages map to [`LocaleId::INVARIANT`].
    pub fn from_tag(tag: &str) -> Self {
        let normalized = normalize_tag(tag);
        if normalized.is_empty() {
            return Self::INVARIANT;
        }

        if let Some(id) = lookup(REGIONAL_LCIDS, &normalized) {
            return LocaleId(id);
        }

        let language = normalized.split('-').next().unwrap_or_default();
        lookup(NEUTRAL_LCIDS, language)
            .map(LocaleId)
            .unwrap_or(Self::INVARIANT)
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_tag(tag: &str) -> String {
    // POSIX locales look like `it_IT.UTF-8@euro`
    let base = tag
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    base.replace('_', "-").to_ascii_lowercase()
}

fn lookup(table: &[(&str, u32)], key: &str) -> Option<u32> {
    table
        .iter()
        .find(|(tag, _)| *tag == key)
        .map(|(_, id)| *id)
}

const REGIONAL_LCIDS: &[(&str, u32)] = &[
    ("ar-sa", 0x0401),
    ("cs-cz", 0x0405),
    ("da-dk", 0x0406),
    ("de-de", 0x0407),
    ("el-gr", 0x0408),
    ("en-us", 0x0409),
    ("en-gb", 0x0809),
    ("es-es", 0x0C0A),
    ("es-mx", 0x080A),
    ("fr-fr", 0x040C),
    ("fr-ca", 0x0C0C),
    ("he-il", 0x040D),
    ("hu-hu", 0x040E),
    ("it-it", 0x0410),
    ("ja-jp", 0x0411),
    ("ko-kr", 0x0412),
    ("nl-nl", 0x0413),
    ("pl-pl", 0x0415),
    ("pt-br", 0x0416),
    ("pt-pt", 0x0816),
    ("ro-ro", 0x0418),
    ("ru-ru", 0x0419),
    ("sk-sk", 0x041B),
    ("sv-se", 0x041D),
    ("tr-tr", 0x041F),
    ("uk-ua", 0x0422),
    ("zh-cn", 0x0804),
    ("zh-tw", 0x0404),
];

const NEUTRAL_LCIDS: &[(&str, u32)] = &[
    ("ar", 0x0001),
    ("zh", 0x0004),
    ("cs", 0x0005),
    ("da", 0x0006),
    ("de", 0x0007),
    ("el", 0x0008),
    ("en", 0x0009),
    ("es", 0x000A),
    ("fr", 0x000C),
    ("he", 0x000D),
    ("hu", 0x000E),
    ("it", 0x0010),
    ("ja", 0x0011),
    ("ko", 0x0012),
    ("nl", 0x0013),
    ("pl", 0x0015),
    ("pt", 0x0016),
    ("ro", 0x0018),
    ("ru", 0x0019),
    ("sk", 0x001B),
    ("sv", 0x001D),
    ("tr", 0x001F),
    ("uk", 0x0022),
];

/// Locale of the current user, as reported by the operating system
pub fn detect_locale() -> LocaleId {
    match sys_locale::get_locale() {
        Some(tag) => LocaleId::from_tag(&tag),
        None => {
            tracing::debug!("System locale unavailable, using invariant culture");
            LocaleId::INVARIANT
        }
    }
}

/// Human readable description of the operating system
pub fn os_descriptor() -> String {
    format!("{} ({})", whoami::distro(), std::env::consts::ARCH)
}

/// Bit 0: the process is 64-bit. Bit 1: the operating system is 64-bit.
pub fn bit_flag() -> u8 {
    let process_64 = cfg!(target_pointer_width = "64");
    let os_64 = matches!(whoami::arch().width(), Ok(whoami::Width::Bits64));
    compose_bit_flag(process_64, os_64)
}

fn compose_bit_flag(process_64: bool, os_64: bool) -> u8 {
    (process_64 as u8) | ((os_64 as u8) << 1)
}
