//! Block-size/layout catalog.
//!
//! The engine's wire protocol selects an object's striping unit through a
//! numeric layout id. The catalog is a fixed bidirectional mapping between
//! the 14 supported I/O block sizes and layout ids 1 through 14, monotonic
//! in size. It never changes at runtime.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced at the catalog boundary.
///
/// Both variants are caller errors: reject immediately, no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The requested block size is not one of the 14 recognized values.
    #[error("unsupported block size '{0}' (supported: 4K..32M, powers of two)")]
    UnsupportedBlockSize(String),

    /// The layout id is outside the recognized 1..=14 range.
    #[error("unsupported layout id {0} (supported: 1..=14)")]
    UnsupportedLayoutId(u8),
}

/// A supported I/O block size.
///
/// The variants are ordered smallest to largest; `Ord` follows byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockSize {
    /// 4 KiB.
    K4,
    /// 8 KiB.
    K8,
    /// 16 KiB.
    K16,
    /// 32 KiB.
    K32,
    /// 64 KiB.
    K64,
    /// 128 KiB.
    K128,
    /// 256 KiB.
    K256,
    /// 512 KiB.
    K512,
    /// 1 MiB.
    M1,
    /// 2 MiB.
    M2,
    /// 4 MiB.
    M4,
    /// 8 MiB.
    M8,
    /// 16 MiB.
    M16,
    /// 32 MiB.
    M32,
}

impl BlockSize {
    /// All supported block sizes, smallest first.
    pub const ALL: [Self; 14] = [
        Self::K4,
        Self::K8,
        Self::K16,
        Self::K32,
        Self::K64,
        Self::K128,
        Self::K256,
        Self::K512,
        Self::M1,
        Self::M2,
        Self::M4,
        Self::M8,
        Self::M16,
        Self::M32,
    ];

    /// Returns the size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::K4 => 4 * 1024,
            Self::K8 => 8 * 1024,
            Self::K16 => 16 * 1024,
            Self::K32 => 32 * 1024,
            Self::K64 => 64 * 1024,
            Self::K128 => 128 * 1024,
            Self::K256 => 256 * 1024,
            Self::K512 => 512 * 1024,
            Self::M1 => 1024 * 1024,
            Self::M2 => 2 * 1024 * 1024,
            Self::M4 => 4 * 1024 * 1024,
            Self::M8 => 8 * 1024 * 1024,
            Self::M16 => 16 * 1024 * 1024,
            Self::M32 => 32 * 1024 * 1024,
        }
    }

    /// Looks up the block size for a byte count.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnsupportedBlockSize`] if `bytes` is not one
    /// of the 14 catalog entries.
    pub fn from_bytes(bytes: u64) -> Result<Self, LayoutError> {
        Self::ALL
            .into_iter()
            .find(|size| size.bytes() == bytes)
            .ok_or_else(|| LayoutError::UnsupportedBlockSize(bytes.to_string()))
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::K4 => "4K",
            Self::K8 => "8K",
            Self::K16 => "16K",
            Self::K32 => "32K",
            Self::K64 => "64K",
            Self::K128 => "128K",
            Self::K256 => "256K",
            Self::K512 => "512K",
            Self::M1 => "1M",
            Self::M2 => "2M",
            Self::M4 => "4M",
            Self::M8 => "8M",
            Self::M16 => "16M",
            Self::M32 => "32M",
        };
        f.write_str(label)
    }
}

impl FromStr for BlockSize {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = match s {
            "4K" => Self::K4,
            "8K" => Self::K8,
            "16K" => Self::K16,
            "32K" => Self::K32,
            "64K" => Self::K64,
            "128K" => Self::K128,
            "256K" => Self::K256,
            "512K" => Self::K512,
            "1M" => Self::M1,
            "2M" => Self::M2,
            "4M" => Self::M4,
            "8M" => Self::M8,
            "16M" => Self::M16,
            "32M" => Self::M32,
            other => return Err(LayoutError::UnsupportedBlockSize(other.to_string())),
        };
        Ok(size)
    }
}

/// A validated layout id in the engine's wire protocol.
///
/// Construction is the only place the 1..=14 range is checked; a held
/// `LayoutId` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct LayoutId(u8);

impl LayoutId {
    /// Creates a layout id from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnsupportedLayoutId`] unless `value` is in
    /// 1..=14.
    pub const fn new(value: u8) -> Result<Self, LayoutError> {
        if matches!(value, 1..=14) {
            Ok(Self(value))
        } else {
            Err(LayoutError::UnsupportedLayoutId(value))
        }
    }

    /// Returns the raw wire-protocol value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the layout id for a block size.
///
/// Total: every supported block size has exactly one layout id. The match
/// is exhaustive, so extending [`BlockSize`] without extending the catalog
/// is a compile error.
#[must_use]
pub const fn layout_for(size: BlockSize) -> LayoutId {
    let raw = match size {
        BlockSize::K4 => 1,
        BlockSize::K8 => 2,
        BlockSize::K16 => 3,
        BlockSize::K32 => 4,
        BlockSize::K64 => 5,
        BlockSize::K128 => 6,
        BlockSize::K256 => 7,
        BlockSize::K512 => 8,
        BlockSize::M1 => 9,
        BlockSize::M2 => 10,
        BlockSize::M4 => 11,
        BlockSize::M8 => 12,
        BlockSize::M16 => 13,
        BlockSize::M32 => 14,
    };
    LayoutId(raw)
}

/// Returns the block size for a validated layout id.
///
/// Total: [`LayoutId`] construction already rejected anything outside the
/// catalog.
#[must_use]
pub const fn block_size_for(layout: LayoutId) -> BlockSize {
    match layout.0 {
        1 => BlockSize::K4,
        2 => BlockSize::K8,
        3 => BlockSize::K16,
        4 => BlockSize::K32,
        5 => BlockSize::K64,
        6 => BlockSize::K128,
        7 => BlockSize::K256,
        8 => BlockSize::K512,
        9 => BlockSize::M1,
        10 => BlockSize::M2,
        11 => BlockSize::M4,
        12 => BlockSize::M8,
        13 => BlockSize::M16,
        // LayoutId::new enforces 1..=14.
        _ => BlockSize::M32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_identity_all_sizes() {
        for size in BlockSize::ALL {
            assert_eq!(block_size_for(layout_for(size)), size);
        }
        for raw in 1..=14u8 {
            let layout = LayoutId::new(raw).unwrap();
            assert_eq!(layout_for(block_size_for(layout)), layout);
        }
    }

    #[test]
    fn test_one_megabyte_is_layout_nine() {
        let size: BlockSize = "1M".parse().unwrap();
        assert_eq!(layout_for(size).get(), 9);
        assert_eq!(block_size_for(LayoutId::new(9).unwrap()), BlockSize::M1);
    }

    #[test]
    fn test_table_monotonic_in_size() {
        for pair in BlockSize::ALL.windows(2) {
            assert!(pair[0].bytes() < pair[1].bytes());
            assert!(layout_for(pair[0]).get() < layout_for(pair[1]).get());
        }
    }

    #[test]
    fn test_unsupported_block_size_rejected() {
        assert_eq!(
            "3K".parse::<BlockSize>(),
            Err(LayoutError::UnsupportedBlockSize("3K".to_string()))
        );
        assert_eq!(
            BlockSize::from_bytes(5000),
            Err(LayoutError::UnsupportedBlockSize("5000".to_string()))
        );
    }

    #[test]
    fn test_unsupported_layout_id_rejected() {
        assert_eq!(LayoutId::new(0), Err(LayoutError::UnsupportedLayoutId(0)));
        assert_eq!(LayoutId::new(15), Err(LayoutError::UnsupportedLayoutId(15)));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(BlockSize::K4.to_string(), "4K");
        assert_eq!(BlockSize::M32.to_string(), "32M");
        for size in BlockSize::ALL {
            assert_eq!(size.to_string().parse::<BlockSize>().unwrap(), size);
        }
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(BlockSize::from_bytes(4096).unwrap(), BlockSize::K4);
        assert_eq!(
            BlockSize::from_bytes(32 * 1024 * 1024).unwrap(),
            BlockSize::M32
        );
    }
}
