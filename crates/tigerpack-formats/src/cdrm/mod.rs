//! CDRM compressed-block container format
//!
//! Every section payload stored in a tiger archive is wrapped in a CDRM
//! container before placement. The composer only ever emits single-block
//! containers in stored (uncompressed) mode:
//!
//! ```text
//! [magic 'CDRM'][version 0][numBlocks 1][numPadding 0]
//! [uncompressedSize<<8 | blockType 1][compressedSize][8 reserved bytes]
//! [payload bytes]
//! -- unless this is the archive's final container --
//! [zero pad to 16-byte alignment]
//! ['NEXT'][distance]
//! ```
//!
//! All fields are little-endian. The trailer's distance field is measured
//! from the `NEXT` marker's own offset and lands the following container on
//! the next 0x800-byte boundary. The final container in the archive carries
//! no trailer and ends exactly at its payload boundary.

mod error;

pub use error::{CdrmError, CdrmResult};

use std::io::{Cursor, Read};

use binrw::BinReaderExt;

use crate::util::align_up;

/// CDRM container magic, 'CDRM' read as a little-endian u32
pub const CDRM_MAGIC: u32 = 0x4D52_4443;

/// Trailer marker, 'NEXT' read as a little-endian u32
pub const NEXT_MAGIC: u32 = 0x5458_454E;

/// Alignment of container start offsets within the archive
pub const CONTAINER_ALIGNMENT: u64 = 0x800;

/// Container header plus the single block header
const FRAME_HEADER_SIZE: u64 = 32;

/// Alignment applied before the trailer marker
const TRAILER_ALIGNMENT: u64 = 0x10;

/// Block type marker for stored (uncompressed) blocks
const STORED_BLOCK_TYPE: u8 = 1;

/// Largest payload expressible in the 24-bit block size field
const MAX_PAYLOAD_SIZE: usize = 0xFF_FFFF;

/// A decoded CDRM container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdrmContainer {
    /// The raw payload bytes of the single stored block
    pub payload: Vec<u8>,
    /// Distance recorded in the trailer, absent on the final container
    pub next_distance: Option<u32>,
}

impl CdrmContainer {
    /// Frame a payload as a stored-mode container
    ///
    /// `last` omits the trailer; every container except the archive's final
    /// one carries a trailer pointing at the next 0x800-aligned offset.
    pub fn encode(payload: &[u8], last: bool) -> CdrmResult<Vec<u8>> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CdrmError::PayloadTooLarge(payload.len()));
        }
        let len = payload.len() as u32;

        let mut out = Vec::with_capacity(Self::framed_len(payload.len(), last) as usize);
        for field in [CDRM_MAGIC, 0, 1, 0] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&(len << 8 | u32::from(STORED_BLOCK_TYPE)).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(payload);

        if !last {
            let marker_pos = align_up(out.len() as u64, TRAILER_ALIGNMENT);
            out.resize(marker_pos as usize, 0);
            out.extend_from_slice(&NEXT_MAGIC.to_le_bytes());
            let distance = align_up(marker_pos + 8, CONTAINER_ALIGNMENT) - marker_pos;
            out.extend_from_slice(&(distance as u32).to_le_bytes());
        }
        Ok(out)
    }

    /// Length of the framed container for a payload of `payload_len` bytes
    pub const fn framed_len(payload_len: usize, last: bool) -> u64 {
        let body = FRAME_HEADER_SIZE + payload_len as u64;
        if last {
            body
        } else {
            align_up(body, TRAILER_ALIGNMENT) + 8
        }
    }

    /// Decode a framed container back into its payload
    pub fn decode(data: &[u8]) -> CdrmResult<Self> {
        let mut reader = Cursor::new(data);

        let magic: u32 = reader.read_le()?;
        if magic != CDRM_MAGIC {
            return Err(CdrmError::InvalidMagic(magic));
        }
        let _version: u32 = reader.read_le()?;
        let num_blocks: u32 = reader.read_le()?;
        if num_blocks != 1 {
            return Err(CdrmError::UnsupportedBlockCount(num_blocks));
        }
        let _num_padding: u32 = reader.read_le()?;

        let packed: u32 = reader.read_le()?;
        let block_type = (packed & 0xFF) as u8;
        if block_type != STORED_BLOCK_TYPE {
            return Err(CdrmError::UnsupportedBlockType(block_type));
        }
        let uncompressed_size = (packed >> 8) as usize;
        let _compressed_size: u32 = reader.read_le()?;
        let mut reserved = [0u8; 8];
        reader.read_exact(&mut reserved)?;

        let available = data.len().saturating_sub(FRAME_HEADER_SIZE as usize);
        if available < uncompressed_size {
            return Err(CdrmError::Truncated {
                declared: uncompressed_size,
                available,
            });
        }
        let mut payload = vec![0u8; uncompressed_size];
        reader.read_exact(&mut payload)?;

        // Trailer, if the framing continues past the payload
        let marker_pos = align_up(FRAME_HEADER_SIZE + uncompressed_size as u64, TRAILER_ALIGNMENT);
        let next_distance = if data.len() as u64 >= marker_pos + 8 {
            reader.set_position(marker_pos);
            let marker: u32 = reader.read_le()?;
            if marker == NEXT_MAGIC {
                Some(reader.read_le()?)
            } else {
                None
            }
        } else {
            None
        };

        Ok(Self {
            payload,
            next_distance,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn final_container_ends_at_payload() {
        let framed = CdrmContainer::encode(&[0xABu8; 17], true).unwrap();
        assert_eq!(framed.len(), 32 + 17);
        assert_eq!(framed.len() as u64, CdrmContainer::framed_len(17, true));
    }

    #[test]
    fn trailer_lands_next_container_on_boundary() {
        for payload_len in [0usize, 1, 15, 16, 17, 100, 0x7DF, 0x7E0, 0x1234] {
            let payload = vec![0x5Au8; payload_len];
            let framed = CdrmContainer::encode(&payload, false).unwrap();
            assert_eq!(
                framed.len() as u64,
                CdrmContainer::framed_len(payload_len, false)
            );

            // Marker sits on a 16-byte boundary with the distance word after it
            let marker_pos = framed.len() - 8;
            assert_eq!(marker_pos % 16, 0);
            let marker = u32::from_le_bytes(framed[marker_pos..marker_pos + 4].try_into().unwrap());
            assert_eq!(marker, NEXT_MAGIC);
            let distance = u32::from_le_bytes(framed[marker_pos + 4..].try_into().unwrap());

            // Distance is measured from the marker offset and must land on 0x800
            assert_eq!((marker_pos as u64 + u64::from(distance)) % 0x800, 0);
            assert!(u64::from(distance) >= 8);
        }
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let payload: Vec<u8> = (0..=255).cycle().take(1000).collect();
        for last in [true, false] {
            let framed = CdrmContainer::encode(&payload, last).unwrap();
            let decoded = CdrmContainer::decode(&framed).unwrap();
            assert_eq!(decoded.payload, payload);
            assert_eq!(decoded.next_distance.is_none(), last);
        }
    }

    #[test]
    fn block_header_declares_stored_mode() {
        let framed = CdrmContainer::encode(b"hello", true).unwrap();
        let packed = u32::from_le_bytes(framed[16..20].try_into().unwrap());
        assert_eq!(packed & 0xFF, 1);
        assert_eq!(packed >> 8, 5);
        let compressed = u32::from_le_bytes(framed[20..24].try_into().unwrap());
        assert_eq!(compressed, 5);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut framed = CdrmContainer::encode(b"data", true).unwrap();
        framed[0] = b'X';
        assert!(matches!(
            CdrmContainer::decode(&framed),
            Err(CdrmError::InvalidMagic(_))
        ));
    }

    #[test]
    fn rejects_compressed_block_type() {
        let mut framed = CdrmContainer::encode(b"data", true).unwrap();
        framed[16] = 2; // zlib-style block type, never emitted here
        assert!(matches!(
            CdrmContainer::decode(&framed),
            Err(CdrmError::UnsupportedBlockType(2))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let framed = CdrmContainer::encode(&[1u8; 64], true).unwrap();
        assert!(matches!(
            CdrmContainer::decode(&framed[..40]),
            Err(CdrmError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        assert!(matches!(
            CdrmContainer::encode(&payload, true),
            Err(CdrmError::PayloadTooLarge(_))
        ));
    }
}
