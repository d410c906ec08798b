//! Tiger record index parsing and building
//!
//! The master archive opens with a 12-byte preamble (opaque to this crate),
//! the record count at offset 0x0C, a 0x24-byte region holding the DLC index
//! and configuration name (also opaque, copied verbatim), and then the
//! record table: fixed 16-byte records sorted ascending by content hash.
//! Everything past the table is the content region.

use binrw::io::{Read, Seek};
use binrw::{BinRead, BinWrite};
use tracing::warn;

use super::error::{TigerError, TigerResult};

/// Byte offset of the record count field
pub const RECORD_COUNT_OFFSET: u64 = 0x0C;

/// Byte offset of the record table
pub const RECORD_TABLE_OFFSET: u64 = 0x34;

/// Size of one index record
pub const RECORD_SIZE: u64 = 0x10;

/// One content record in the archive index
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct TigerRecord {
    /// Content hash the engine looks the record up by
    pub hash: u32,
    /// Spec mask selecting which configurations see the record
    pub spec_mask: u32,
    /// Byte size of the stored blob
    pub size: u32,
    /// Blob offset, tagged with the patch/DLC index in the low bits
    pub packed_offset: u32,
}

/// The archive's parsed lookup table plus its opaque header regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TigerIndex {
    /// 12-byte archive preamble, copied verbatim
    pub preamble: [u8; 12],
    /// DLC index and configuration name region, copied verbatim
    pub dlc_region: [u8; 0x24],
    /// Content records, sorted ascending by hash
    pub records: Vec<TigerRecord>,
}

impl TigerIndex {
    /// Parse the index from the start of an archive stream
    ///
    /// Rejects duplicate hashes outright; an unsorted table is tolerated
    /// with a warning since insertion re-sorts it anyway.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> TigerResult<Self> {
        let mut preamble = [0u8; 12];
        reader.read_exact(&mut preamble)?;
        let record_count: u32 = u32::read_le(reader)?;
        let mut dlc_region = [0u8; 0x24];
        reader.read_exact(&mut dlc_region)?;

        // The count field is untrusted; cap the reservation and let the
        // record reads fail on a truncated table
        let mut records = Vec::with_capacity(record_count.min(1024) as usize);
        for _ in 0..record_count {
            records.push(TigerRecord::read(reader)?);
        }

        if !records.is_sorted_by_key(|r| r.hash) {
            warn!("record index is not sorted by hash");
        }
        let mut hashes: Vec<u32> = records.iter().map(|r| r.hash).collect();
        hashes.sort_unstable();
        if let Some(duplicate) = hashes.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(TigerError::DuplicateRecordHash(duplicate[0]));
        }

        Ok(Self {
            preamble,
            dlc_region,
            records,
        })
    }

    /// Number of records in the index
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, keeping the table sorted ascending by hash
    pub fn insert(&mut self, record: TigerRecord) -> TigerResult<()> {
        if self.records.iter().any(|r| r.hash == record.hash) {
            return Err(TigerError::DuplicateRecordHash(record.hash));
        }
        self.records.push(record);
        self.records.sort_by_key(|r| r.hash);
        Ok(())
    }

    /// Look up a record by content hash
    pub fn find(&self, hash: u32) -> Option<&TigerRecord> {
        self.records
            .binary_search_by_key(&hash, |r| r.hash)
            .ok()
            .map(|index| &self.records[index])
    }
}
