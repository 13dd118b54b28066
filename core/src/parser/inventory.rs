use flashr_common::device::inventory::{DiskInventory, FileEntry};
use flashr_common::error::ParseError;
use tracing::debug;

const TOTAL_MARKER: &str = "bytes total";
const FREE_MARKER: &str = "bytes free";

const FREE_TOKEN: usize = 3;
const SIZE_TOKEN: usize = 2;
const TIMESTAMP_TOKENS: std::ops::Range<usize> = 3..6;

/// Result of one pass over a directory listing.
///
/// Field-level problems do not abort the pass; they are collected in `errors`
/// while the rest of the listing is still read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryScan {
    pub inventory: DiskInventory,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone)]
pub struct InventoryParser {
    extension: String,
}

impl InventoryParser {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Reads capacity, free space and image files from a `dir` listing.
    ///
    /// ```text
    /// Directory of bootflash:/
    ///
    ///    11  -rw-   450915116  Mar 7 2019 10:06:37 +00:00  cat3k_caa-universalk9.16.09.03a.SPA.bin
    ///
    /// 1621966848 bytes total (1015209984 bytes free)
    /// ```
    ///
    /// Every line mentioning the image extension is read as a file entry, so renamed
    /// copies such as `16.9.3.bin.bak` are listed too. Missing capacity lines leave the
    /// value at zero and are reported. Free space larger than the capacity is reported
    /// and clamped to the capacity.
    pub fn parse(&self, raw: &str) -> InventoryScan {
        let mut errors: Vec<ParseError> = Vec::new();
        let mut total: Option<u64> = None;
        let mut free: Option<u64> = None;
        let mut files: Vec<FileEntry> = Vec::new();

        for line in raw.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();

            if line.contains(TOTAL_MARKER) {
                match parse_bytes("total capacity", tokens.first().copied()) {
                    Ok(value) => total = Some(value),
                    Err(e) => errors.push(e),
                }
            }

            if line.contains(FREE_MARKER) {
                let token = tokens.get(FREE_TOKEN).map(|t| t.trim_matches(['(', ')']));
                match parse_bytes("free space", token) {
                    Ok(value) => free = Some(value),
                    Err(e) => errors.push(e),
                }
            }

            if line.contains(self.extension.as_str()) {
                match file_entry(&tokens) {
                    Ok(entry) => files.push(entry),
                    Err(e) => errors.push(e),
                }
            }
        }

        if total.is_none() {
            errors.push(ParseError::MissingField(TOTAL_MARKER));
        }
        if free.is_none() {
            errors.push(ParseError::MissingField(FREE_MARKER));
        }

        let total = total.unwrap_or(0);
        let free = free.unwrap_or(0);
        let inventory = match DiskInventory::new(total, free, files.clone()) {
            Ok(inventory) => inventory,
            Err(e) => {
                errors.push(e);
                DiskInventory::new(total, total, files).unwrap_or_default()
            }
        };

        debug!(
            files = inventory.files().len(),
            errors = errors.len(),
            "Directory listing parsed"
        );

        InventoryScan { inventory, errors }
    }
}

fn parse_bytes(field: &'static str, token: Option<&str>) -> Result<u64, ParseError> {
    let token = token.unwrap_or_default();
    token.parse::<u64>().map_err(|_| ParseError::InvalidField {
        field,
        token: token.to_string(),
    })
}

fn file_entry(tokens: &[&str]) -> Result<FileEntry, ParseError> {
    let name = tokens.last().copied().unwrap_or_default();
    if tokens.len() <= TIMESTAMP_TOKENS.end {
        return Err(ParseError::InvalidField {
            field: "file entry",
            token: tokens.join(" "),
        });
    }

    Ok(FileEntry {
        name: name.to_string(),
        size_bytes: parse_bytes("file size", tokens.get(SIZE_TOKEN).copied())?,
        timestamp: tokens[TIMESTAMP_TOKENS].join(" "),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
