/// Flag bits attached to an archive entry by the mounter.
///
/// Only `STRUCTURED_RECORD` is interpreted by this crate; other bits pass
/// through untouched so mounters can carry backend-specific markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryFlags(u32);

impl EntryFlags {
    pub const NONE: EntryFlags = EntryFlags(0);

    /// The entry is a self-contained structured record.
    pub const STRUCTURED_RECORD: EntryFlags = EntryFlags(1);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        EntryFlags(bits)
    }

    #[must_use]
    pub const fn contains(self, other: EntryFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for EntryFlags {
    type Output = EntryFlags;

    fn bitor(self, rhs: EntryFlags) -> EntryFlags {
        EntryFlags(self.0 | rhs.0)
    }
}

/// One entry inside a mounted archive, in archive-native order.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path of the entry relative to the archive root.
    pub path: String,
    pub flags: EntryFlags,
}

impl ArchiveEntry {
    #[must_use]
    pub fn record(path: impl Into<String>) -> Self {
        ArchiveEntry {
            path: path.into(),
            flags: EntryFlags::STRUCTURED_RECORD,
        }
    }

    #[must_use]
    pub fn is_record(&self) -> bool {
        self.flags.contains(EntryFlags::STRUCTURED_RECORD)
    }
}
