//! Byte layout of the animation stream.
//!
//! ```text
//! vertical literal    lllhhhhh LLLLLLLL data...          h = addr[12:8] + 8, l = len - 1
//! linear literal      111nnnnn LLLLLLLL 0HHHHHHH data... n = len / 2 - 1
//! vertical reference  lllhhhhh LLLLLLLL 000ooooo oooooooo h = addr[12:8]
//! linear reference    111nnnnn LLLLLLLL 1HHHHHHH 000ooooo oooooooo
//! ```
//!
//! Offsets count backwards from the start of the reference record to the
//! start of the literal record holding the pattern.

use crate::*;

pub const END_OF_FRAME: u8 = 0x00;
pub const END_OF_STREAM: u8 = 0x01;
pub const PAGE_MARKER: u8 = 0x02;

pub const LENGTH_SHIFT: u8 = 5;

/// Added to the address high bits of literal records, keeping their first
/// byte clear of the marker values.
pub const LITERAL_BIAS: u8 = 8;

/// First byte tag of linear records; vertical literals never produce it since
/// their low five bits are at least [`LITERAL_BIAS`].
pub const LINEAR_TAG: u8 = 0b111 << LENGTH_SHIFT;
pub const LINEAR_REFERENCE_FLAG: u8 = 0x80;

/// Offsets are 13 bits wide.
pub const MAX_OFFSET: usize = 0x2000;
pub const OFFSET_HIGH_MASK: u8 = 0x1f;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Literal,
    Reference,

    /// Reference whose base was out of reach, written as a literal instead.
    Promoted,
}

/// Append-only stream buffer.
///
/// Rewinding is limited to the crate: the writer drops a reference it
/// couldn't keep and the pager rolls back a frame that overflowed its page.
#[derive(Clone, Debug, Default)]
pub struct Output {
    bytes: Vec<u8>,
}

impl Output {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Removes and returns the first `len` bytes.
    pub(crate) fn take_front(&mut self, len: usize) -> Vec<u8> {
        self.bytes.drain(..len).collect()
    }

    pub(crate) fn literal(&mut self, address: u16, shape: Shape, bytes: &[u8]) {
        let [hi, lo] = address.to_be_bytes();

        match shape {
            Shape::Vertical => {
                self.bytes.extend_from_slice(&[
                    length_tag(bytes.len()) | (hi + LITERAL_BIAS),
                    lo,
                ]);
            }

            Shape::Linear => {
                self.bytes
                    .extend_from_slice(&[LINEAR_TAG | pair_count(bytes.len()), lo, hi]);
            }
        }

        self.bytes.extend_from_slice(bytes);
    }

    pub(crate) fn reference(&mut self, address: u16, shape: Shape, len: usize, offset: usize) {
        let [hi, lo] = address.to_be_bytes();

        match shape {
            Shape::Vertical => {
                self.bytes.extend_from_slice(&[length_tag(len) | hi, lo]);
            }

            Shape::Linear => {
                self.bytes.extend_from_slice(&[
                    LINEAR_TAG | pair_count(len),
                    lo,
                    hi | LINEAR_REFERENCE_FLAG,
                ]);
            }
        }

        self.bytes
            .extend_from_slice(&[(offset >> 8) as u8 & OFFSET_HIGH_MASK, offset as u8]);
    }
}

fn length_tag(len: usize) -> u8 {
    debug_assert!((1..=8).contains(&len));

    ((len - 1) as u8) << LENGTH_SHIFT
}

fn pair_count(len: usize) -> u8 {
    debug_assert!(len % 2 == 0 && (2..=16).contains(&len));

    (len / 2 - 1) as u8
}
