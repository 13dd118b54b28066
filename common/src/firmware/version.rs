//! # Firmware Version Model
//!
//! A version is `major.minor.rebuild` with an optional `a` suffix on the rebuild
//! (e.g. `16.9.3a`). Versions compare field by field, and an `a` rebuild is newer
//! than the plain rebuild of the same number:
//!
//! ```text
//! 16.9.3 < 16.9.3a < 16.9.4 < 16.10.1
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Interim rebuild marker carried by the third version component.
///
/// Declaration order defines the ordering: `None < A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SpecialRelease {
    #[default]
    None,
    A,
}

impl SpecialRelease {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::A => "a",
        }
    }
}

/// Field order matters: the derived `Ord` compares `major`, `minor`, `rebuild`, `special`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    major: u32,
    minor: u32,
    rebuild: u32,
    special: SpecialRelease,
}

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32, rebuild: u32, special: SpecialRelease) -> Self {
        Self {
            major,
            minor,
            rebuild,
            special,
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn rebuild(&self) -> u32 {
        self.rebuild
    }

    pub fn special(&self) -> SpecialRelease {
        self.special
    }

    /// Builds a version from its three dotted components.
    ///
    /// The first two must be plain digits, the third may end in `a`.
    pub fn from_parts(major: &str, minor: &str, rebuild: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidVersion(format!("{major}.{minor}.{rebuild}"));

        let (rebuild_digits, special) = match rebuild.strip_suffix('a') {
            Some(digits) => (digits, SpecialRelease::A),
            None => (rebuild, SpecialRelease::None),
        };

        Ok(Self {
            major: parse_component(major).ok_or_else(invalid)?,
            minor: parse_component(minor).ok_or_else(invalid)?,
            rebuild: parse_component(rebuild_digits).ok_or_else(invalid)?,
            special,
        })
    }

    /// Extracts the version encoded in an image file name.
    ///
    /// Both bare names (`16.9.3a.bin`) and vendor names
    /// (`cat3k_caa-universalk9.16.09.03a.SPA.bin`, `image-16.9.3.bin`) are accepted.
    /// The first run of three dot-separated components that forms a valid version wins;
    /// runs starting with a purely numeric component are preferred over runs whose first
    /// component only ends in digits.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let segments: Vec<&str> = file_name.split('.').collect();

        segments
            .windows(3)
            .find_map(|run| Self::from_parts(run[0], run[1], run[2]).ok())
            .or_else(|| {
                segments.windows(3).find_map(|run| {
                    Self::from_parts(trailing_digits(run[0]), run[1], run[2]).ok()
                })
            })
    }
}

impl FromStr for FirmwareVersion {
    type Err = ParseError;

    /// Parses a dotted token such as `16.9.3a` or `16.09.03`.
    ///
    /// Surrounding punctuation left by device output (e.g. a trailing comma) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().trim_end_matches([',', ';']);
        let parts: Vec<&str> = token.split('.').collect();

        match parts.as_slice() {
            [major, minor, rebuild] => Self::from_parts(major, minor, rebuild),
            _ => Err(ParseError::InvalidVersion(s.to_string())),
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}",
            self.major,
            self.minor,
            self.rebuild,
            self.special.as_str()
        )
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}

fn trailing_digits(s: &str) -> &str {
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(s.len(), |(idx, _)| idx);
    &s[start..]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
