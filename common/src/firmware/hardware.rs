use std::fmt;

/// Hardware tags recognized in device output out of the box.
pub const KNOWN_HARDWARE: &[&str] = &[
    "WS-CS3650-48PS",
    "ISR4331",
    "WS-C3650-48FS-S",
    "WS-C3850-24XS-S",
    "WS-C2960X-48FPS-L",
    "WS-C2960X-24PS-L",
    "WS-C2960X-48LPS-L",
];

/// The platform of a device, as far as the allow-list can tell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HardwareModel {
    Known(String),
    Unknown,
}

impl HardwareModel {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Known(tag) => Some(tag),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for HardwareModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("unknown"))
    }
}

/// Ordered list of hardware tags matched against device output.
#[derive(Debug, Clone)]
pub struct HardwareAllowList {
    tags: Vec<String>,
}

impl Default for HardwareAllowList {
    fn default() -> Self {
        Self {
            tags: KNOWN_HARDWARE.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

impl HardwareAllowList {
    /// Built-in tags followed by `extra`, skipping duplicates.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for tag in extra {
            let tag: String = tag.into();
            if !tag.is_empty() && !list.tags.contains(&tag) {
                list.tags.push(tag);
            }
        }
        list
    }

    /// Returns the last tag of the list that occurs in `line`.
    pub fn match_line(&self, line: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|tag| line.contains(tag.as_str()))
            .last()
            .map(String::as_str)
    }
}
