//! # Memory Trace Reader
//!
//! Traces are flat files of fixed-size little-endian records, one per
//! memory access:
//!
//! ```text
//! 0      4       5      6      7      8            12
//! | addr | reqtype | size | attr | proc | time       |
//! |  u32 |   u8    |  u8  |  u8  |  u8  |  u32       |
//! ```
//!
//! Only `addr` drives the simulation. The remaining eight bytes are kept as
//! a packed [`RecordMeta`] so they can be inspected in log output.

use bitfield_struct::bitfield;
use sim_addresses::VirtualAddress;
use std::io::{self, ErrorKind, Read};

/// Size of one trace record in bytes.
pub const RECORD_SIZE: usize = 12;

/// Access metadata following the address of a record.
///
/// Field order matches the on-disk byte order, so the little-endian `u64`
/// over bytes `4..12` is the raw bit pattern.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct RecordMeta {
    /// Request type as recorded by the tracer.
    pub reqtype: u8,
    /// Access size in bytes.
    pub size: u8,
    pub attr: u8,
    /// Id of the issuing process.
    pub process: u8,
    /// Timestamp.
    pub time: u32,
}

/// One decoded trace record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub address: VirtualAddress,
    pub meta: RecordMeta,
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),
    #[error("truncated trace record at byte {offset}: {len} of {RECORD_SIZE} bytes")]
    Truncated { offset: u64, len: usize },
}

impl TraceRecord {
    #[must_use]
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let [a0, a1, a2, a3, m @ ..] = *bytes;
        Self {
            address: VirtualAddress::new(u32::from_le_bytes([a0, a1, a2, a3])),
            meta: RecordMeta::from_bits(u64::from_le_bytes(m)),
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[..4].copy_from_slice(&self.address.as_u32().to_le_bytes());
        out[4..].copy_from_slice(&self.meta.into_bits().to_le_bytes());
        out
    }
}

/// Iterates the records of a trace.
///
/// A trailing partial record yields one [`TraceError::Truncated`] and ends
/// the iteration, as does any I/O error.
#[derive(Debug)]
pub struct TraceReader<R> {
    inner: R,
    offset: u64,
    done: bool,
}

impl<R: Read> TraceReader<R> {
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Byte offset of the next record.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Fill `buf` as far as the input allows; returns the bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = [0u8; RECORD_SIZE];
        let len = match self.fill(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        match len {
            0 => {
                self.done = true;
                None
            }
            RECORD_SIZE => {
                self.offset += RECORD_SIZE as u64;
                Some(Ok(TraceRecord::from_bytes(&buf)))
            }
            _ => {
                self.done = true;
                Some(Err(TraceError::Truncated {
                    offset: self.offset,
                    len,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: [u8; RECORD_SIZE] = [
        0x78, 0x56, 0x34, 0x12, // addr
        0x01, // reqtype
        0x04, // size
        0x00, // attr
        0x07, // proc
        0x10, 0x00, 0x00, 0x00, // time
    ];

    #[test]
    fn decodes_little_endian_fields() {
        let r = TraceRecord::from_bytes(&SAMPLE);
        assert_eq!(r.address.as_u32(), 0x1234_5678);
        assert_eq!(r.meta.reqtype(), 1);
        assert_eq!(r.meta.size(), 4);
        assert_eq!(r.meta.attr(), 0);
        assert_eq!(r.meta.process(), 7);
        assert_eq!(r.meta.time(), 16);
        assert_eq!(r.to_bytes(), SAMPLE);
    }

    #[test]
    fn reads_records_until_eof() {
        let mut bytes = SAMPLE.to_vec();
        bytes.extend_from_slice(&SAMPLE);
        let mut reader = TraceReader::new(Cursor::new(bytes));
        assert!(reader.next().is_some_and(|r| r.is_ok()));
        assert!(reader.next().is_some_and(|r| r.is_ok()));
        assert_eq!(reader.offset(), 24);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_trace_has_no_records() {
        assert_eq!(TraceReader::new(io::empty()).count(), 0);
    }

    #[test]
    fn partial_record_is_reported_once() {
        let mut bytes = SAMPLE.to_vec();
        bytes.extend_from_slice(&SAMPLE[..5]);
        let mut reader = TraceReader::new(Cursor::new(bytes));

        assert!(reader.next().is_some_and(|r| r.is_ok()));
        assert!(matches!(
            reader.next(),
            Some(Err(TraceError::Truncated { offset: 12, len: 5 }))
        ));
        assert!(reader.next().is_none());
    }

    /// Hands out one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&b, rest)), Some(slot)) => {
                    *slot = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn short_reads_are_stitched_together() {
        let records: Vec<_> = TraceReader::new(Trickle(&SAMPLE))
            .collect::<Result<_, _>>()
            .expect("complete record");
        assert_eq!(records, [TraceRecord::from_bytes(&SAMPLE)]);
    }
}
