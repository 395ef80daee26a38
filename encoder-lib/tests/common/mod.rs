#![allow(dead_code)]

use scr_ani::*;

pub fn screen(cells: &[(usize, u8)]) -> Screen {
    let mut screen = Screen::blank();

    for &(idx, value) in cells {
        screen.as_bytes_mut()[idx] = value;
    }

    screen
}

/// Bitmap offset of the top line of character cell `cell` (0..768).
pub fn cell_address(cell: usize) -> usize {
    let third = cell / 256;
    let row = (cell / 32) % 8;
    let col = cell % 32;

    third * 2048 + row * 32 + col
}

pub fn encode(params: &Params, frames: &[Screen]) -> (Stats, Vec<(String, Vec<u8>)>) {
    let mut encoder = Encoder::new(params, "test", MemorySink::default());

    for frame in frames {
        encoder.add(frame);
    }

    let (stats, sink) = encoder.finish();

    (stats, sink.into_pages())
}

pub fn concat(pages: &[(String, Vec<u8>)]) -> Vec<u8> {
    pages.iter().flat_map(|(_, page)| page.iter().copied()).collect()
}

/// Record with references already resolved into the bytes they point at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub address: usize,
    pub shape: Shape,
    pub bytes: Vec<u8>,
}

impl Literal {
    pub fn apply(&self, screen: &mut Screen, policy: WritePolicy) {
        let stride = self.shape.stride();

        for (i, &byte) in self.bytes.iter().enumerate() {
            let cell = &mut screen.as_bytes_mut()[self.address + i * stride];

            *cell = match policy {
                WritePolicy::Xor => *cell ^ byte,
                WritePolicy::Direct => byte,
            };
        }
    }
}

enum Record {
    Literal(Literal),

    Reference {
        address: usize,
        shape: Shape,
        len: usize,
        offset: usize,
    },
}

/// Reads the record starting at `pos`, returning it with its size.
///
/// Vertical references carry the address high bits unbiased, so they can only
/// be told apart from literals for addresses below 0x0800 and lengths below 8;
/// streams fed in here have to stick to that.
fn record_at(page: &[u8], pos: usize) -> (Record, usize) {
    let head = page[pos];
    let low = head & 0x1f;
    let lo = page[pos + 1] as usize;

    let offset_at = |at: usize| ((page[at] as usize) << 8) | page[at + 1] as usize;

    if head & LINEAR_TAG == LINEAR_TAG && low < LITERAL_BIAS {
        let hi = page[pos + 2];
        let address = (((hi & !LINEAR_REFERENCE_FLAG) as usize) << 8) | lo;
        let len = (low as usize + 1) * 2;

        if hi & LINEAR_REFERENCE_FLAG != 0 {
            let offset = offset_at(pos + 3);
            let record = Record::Reference {
                address,
                shape: Shape::Linear,
                len,
                offset,
            };

            return (record, 5);
        }

        let bytes = page[pos + 3..pos + 3 + len].to_vec();
        let record = Record::Literal(Literal {
            address,
            shape: Shape::Linear,
            bytes,
        });

        return (record, 3 + len);
    }

    let len = (head >> 5) as usize + 1;

    if low >= LITERAL_BIAS {
        let address = (((low - LITERAL_BIAS) as usize) << 8) | lo;
        let bytes = page[pos + 2..pos + 2 + len].to_vec();
        let record = Record::Literal(Literal {
            address,
            shape: Shape::Vertical,
            bytes,
        });

        (record, 2 + len)
    } else {
        let record = Record::Reference {
            address: ((low as usize) << 8) | lo,
            shape: Shape::Vertical,
            len,
            offset: offset_at(pos + 2),
        };

        (record, 4)
    }
}

/// Decodes pages into frames of records; a page marker ends a frame just like
/// an end-of-frame marker does. References are resolved within their own
/// page, which also checks that none of them reaches into an earlier one.
pub fn decode(pages: &[(String, Vec<u8>)]) -> Vec<Vec<Literal>> {
    let mut frames = Vec::new();
    let mut frame = Vec::new();

    for (idx, (name, page)) in pages.iter().enumerate() {
        let mut pos = 0;

        while pos < page.len() {
            match page[pos] {
                END_OF_FRAME | PAGE_MARKER => {
                    if page[pos] == PAGE_MARKER {
                        assert_eq!(pos + 1, page.len(), "{}: page marker inside the page", name);
                    }

                    frames.push(std::mem::take(&mut frame));
                    pos += 1;
                    continue;
                }

                END_OF_STREAM => {
                    assert_eq!(idx + 1, pages.len(), "{}: end of stream too early", name);
                    assert_eq!(pos + 1, page.len(), "{}: trailing bytes", name);
                    assert!(frame.is_empty(), "unterminated frame");
                    return frames;
                }

                _ => {}
            }

            let (record, size) = record_at(page, pos);

            let literal = match record {
                Record::Literal(literal) => literal,

                Record::Reference {
                    address,
                    shape,
                    len,
                    offset,
                } => {
                    assert!(offset < MAX_OFFSET, "{}@{}: offset {}", name, pos, offset);

                    let base = pos
                        .checked_sub(offset)
                        .unwrap_or_else(|| panic!("{}@{}: base in another page", name, pos));

                    let bytes = match record_at(page, base) {
                        (Record::Literal(base), _) => base.bytes[..len].to_vec(),
                        _ => panic!("{}@{}: reference to a reference", name, pos),
                    };

                    Literal {
                        address,
                        shape,
                        bytes,
                    }
                }
            };

            frame.push(literal);
            pos += size;
        }
    }

    panic!("missing end of stream");
}
