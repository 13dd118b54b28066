use flashr_common::error::ParseError;
use flashr_common::firmware::hardware::{HardwareAllowList, HardwareModel};
use flashr_common::firmware::version::FirmwareVersion;

/// Line identifying the running software in `show version` output.
pub const SOFTWARE_MARKER: &str = "Cisco IOS XE Software";
const VERSION_KEYWORD: &str = "Version";

#[derive(Debug, Clone, Default)]
pub struct VersionParser {
    hardware: HardwareAllowList,
}

impl VersionParser {
    pub fn new(hardware: HardwareAllowList) -> Self {
        Self { hardware }
    }

    /// Reads the running version and the hardware model from `show version` output.
    ///
    /// The version comes from the first [`SOFTWARE_MARKER`] line that carries a valid
    /// dotted token. The hardware model is the last allow-listed tag seen anywhere in the
    /// output, since the model may be printed more than once. A missing hardware tag is
    /// not an error and yields [`HardwareModel::Unknown`]; a missing version is.
    pub fn parse(&self, raw: &str) -> Result<(FirmwareVersion, HardwareModel), ParseError> {
        let mut version: Option<FirmwareVersion> = None;
        let mut version_error: Option<ParseError> = None;
        let mut hardware = HardwareModel::Unknown;

        for line in raw.lines() {
            if version.is_none() && line.contains(SOFTWARE_MARKER) {
                match version_from_marker_line(line) {
                    Ok(found) => version = Some(found),
                    Err(e) => version_error = Some(e),
                }
            }

            if let Some(tag) = self.hardware.match_line(line) {
                hardware = HardwareModel::Known(tag.to_string());
            }
        }

        match version {
            Some(version) => Ok((version, hardware)),
            None => Err(version_error.unwrap_or(ParseError::MissingVersionLine)),
        }
    }
}

fn version_from_marker_line(line: &str) -> Result<FirmwareVersion, ParseError> {
    let token = line
        .split_once(VERSION_KEYWORD)
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .ok_or_else(|| ParseError::InvalidVersion(line.trim().to_string()))?;

    // Banners may end the sentence right after the version.
    token.trim_end_matches(['.', ',', ';']).parse()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
