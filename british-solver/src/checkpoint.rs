//! On-disk form of the solver table.
//!
//! A British Square table is small (8,659 canonical positions from the empty
//! board), so it is written and read in one piece:
//!
//! ```text
//! offset  size  field
//!      0     4  magic "BSQ1"
//!      4     4  format version, u32 LE
//!      8     8  number of positions, u64 LE
//!     16     8  xxh64 of the position records
//!     24     8  zero
//!     32   9*n  records: packed canonical board u64 LE, score i8
//! ```
//!
//! Records are written in ascending board order, so equal tables produce
//! identical files. Loading rejects records that are not valid boards or
//! whose score is out of range.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use british_core::{Board, NUM_CELLS};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"BSQ1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const RECORD_SIZE: usize = 9;

/// Largest score magnitude a 4x4 position can reach.
const MAX_SCORE: i8 = NUM_CELLS as i8 + 1;

/// Solved positions read back from disk.
pub struct Checkpoint {
    pub entries: Vec<(u64, i8)>,
}

/// Fixed-size file header.
struct Header {
    positions: u64,
    checksum: u64,
}

impl Header {
    fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..8].copy_from_slice(&VERSION.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.positions.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    fn decode(bytes: &[u8; HEADER_SIZE]) -> io::Result<Header> {
        if &bytes[0..4] != MAGIC {
            return Err(invalid(format!(
                "not a British Square table (magic {:?})",
                String::from_utf8_lossy(&bytes[0..4])
            )));
        }
        let version = u32::from_le_bytes(field(&bytes[4..8]));
        if version != VERSION {
            return Err(invalid(format!("table format version {} is not supported", version)));
        }
        Ok(Header {
            positions: u64::from_le_bytes(field(&bytes[8..16])),
            checksum: u64::from_le_bytes(field(&bytes[16..24])),
        })
    }
}

fn field<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Decode one record, checking it names a real board and a reachable score.
fn decode_record(record: &[u8]) -> io::Result<(u64, i8)> {
    let canonical = u64::from_le_bytes(field(&record[..8]));
    let score = record[8] as i8;
    if Board::from_u64(canonical).is_err() {
        return Err(invalid(format!("table holds an invalid board {:#x}", canonical)));
    }
    if !(-MAX_SCORE..=MAX_SCORE).contains(&score) {
        return Err(invalid(format!("board {:#x} has impossible score {}", canonical, score)));
    }
    Ok((canonical, score))
}

impl Checkpoint {
    /// Write the solver table to `path`. Returns the number of positions.
    pub fn save(path: &Path, table: &HashMap<u64, i8>) -> io::Result<usize> {
        let mut records: Vec<(u64, i8)> = table.iter().map(|(&k, &v)| (k, v)).collect();
        records.sort_unstable_by_key(|&(canonical, _)| canonical);

        let mut data = Vec::with_capacity(records.len() * RECORD_SIZE);
        for (canonical, score) in &records {
            data.extend_from_slice(&canonical.to_le_bytes());
            data.push(*score as u8);
        }

        let header = Header {
            positions: records.len() as u64,
            checksum: xxh64(&data, 0),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&header.encode())?;
        writer.write_all(&data)?;
        writer.flush()?;

        Ok(records.len())
    }

    /// Read a table written by [`Checkpoint::save`].
    ///
    /// Any format problem is reported as `InvalidData`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;
        let header = Header::decode(&header)?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        usize::try_from(header.positions)
            .ok()
            .and_then(|n| n.checked_mul(RECORD_SIZE))
            .filter(|&len| len == data.len())
            .ok_or_else(|| {
                invalid(format!(
                    "header promises {} positions but the table holds {} bytes",
                    header.positions,
                    data.len()
                ))
            })?;

        if xxh64(&data, 0) != header.checksum {
            return Err(invalid("table checksum mismatch".to_string()));
        }

        let entries = data
            .chunks_exact(RECORD_SIZE)
            .map(decode_record)
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Checkpoint { entries })
    }

    /// File size in bytes of a table with `positions` entries.
    pub fn file_size(positions: usize) -> usize {
        HEADER_SIZE + positions * RECORD_SIZE
    }
}
