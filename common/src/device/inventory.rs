use crate::error::ParseError;

/// A file listed on device storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    /// Modification time exactly as the device printed it.
    pub timestamp: String,
}

/// Capacity and content of a device file system.
///
/// `free_space_bytes <= total_capacity_bytes` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskInventory {
    total_capacity_bytes: u64,
    free_space_bytes: u64,
    files: Vec<FileEntry>,
}

impl DiskInventory {
    pub fn new(
        total_capacity_bytes: u64,
        free_space_bytes: u64,
        files: Vec<FileEntry>,
    ) -> Result<Self, ParseError> {
        if free_space_bytes > total_capacity_bytes {
            return Err(ParseError::CapacityMismatch {
                free: free_space_bytes,
                total: total_capacity_bytes,
            });
        }
        Ok(Self {
            total_capacity_bytes,
            free_space_bytes,
            files,
        })
    }

    pub fn total_capacity_bytes(&self) -> u64 {
        self.total_capacity_bytes
    }

    pub fn free_space_bytes(&self) -> u64 {
        self.free_space_bytes
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|file| file.name == name)
    }
}
