use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    /// Same byte of consecutive pixel lines within a character cell.
    Vertical,

    /// Consecutive bytes of video memory.
    Linear,
}

impl Shape {
    pub fn stride(self) -> usize {
        match self {
            Shape::Vertical => 256,
            Shape::Linear => 1,
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            Shape::Vertical => 8,
            Shape::Linear => 16,
        }
    }

    pub fn min_len(self) -> usize {
        match self {
            Shape::Vertical => 2,
            Shape::Linear => 4,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Shape::Vertical => Shape::Linear,
            Shape::Linear => Shape::Vertical,
        }
    }
}

/// Run of changed bytes starting at `address`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    address: u16,
    shape: Shape,
    bytes: Vec<u8>,
    live: usize,
}

impl Block {
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Payload exactly as it gets written; doubles as the block's signature.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    fn is_admissible(&self) -> bool {
        self.len() >= self.shape.min_len()
    }

    fn forced(self) -> Self {
        if self.live == 1 {
            Self {
                shape: Shape::Vertical,
                bytes: self.bytes[..1].to_vec(),
                ..self
            }
        } else {
            self
        }
    }

    fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        (self.address as usize..)
            .step_by(self.shape.stride())
            .take(self.len())
    }

    /// Builds a block out of raw parts; `bytes` must already be trimmed.
    #[cfg(test)]
    pub(crate) fn new(address: u16, shape: Shape, bytes: Vec<u8>) -> Self {
        Self {
            address,
            shape,
            live: bytes.len(),
            bytes,
        }
    }
}

/// Walks `shape` from `address`, reading values from `data` and looking for
/// changes in `locator`. More than `hole_tolerance` unchanged cells in a row
/// end the walk; trailing unchanged cells are trimmed off.
///
/// Returns `None` when there's nothing changed at `address` or when a linear
/// run can't be padded to an even length.
pub fn probe(
    locator: &[u8; SCREEN_SIZE],
    data: &[u8; SCREEN_SIZE],
    address: usize,
    shape: Shape,
    hole_tolerance: u8,
) -> Option<Block> {
    let mut bytes = Vec::with_capacity(shape.max_len());
    let mut live = 0;
    let mut holes = 0;

    for ptr in (address..SCREEN_SIZE)
        .step_by(shape.stride())
        .take(shape.max_len())
    {
        if locator[ptr] == 0 {
            holes += 1;

            if holes > hole_tolerance {
                break;
            }
        } else {
            holes = 0;
        }

        bytes.push(data[ptr]);

        if locator[ptr] != 0 {
            live = bytes.len();
        }
    }

    if live == 0 {
        return None;
    }

    bytes.truncate(live);

    if shape == Shape::Linear && live % 2 == 1 {
        let pad = address + live;

        if pad >= SCREEN_SIZE {
            return None;
        }

        bytes.push(data[pad]);
    }

    Some(Block {
        address: address as u16,
        shape,
        bytes,
        live,
    })
}

/// Picks a block at `address` according to `params` and clears every cell
/// it covers in `locator`, so the ascending scan never extracts them again.
///
/// When `data` is `None`, values are taken from `locator` itself (XOR
/// policy). Returns `None` when the cell is skipped; in lossy mode its change
/// stays in `locator`.
pub fn extract(
    locator: &mut [u8; SCREEN_SIZE],
    data: Option<&[u8; SCREEN_SIZE]>,
    address: usize,
    params: &Params,
) -> Option<Block> {
    let primary = params.shape_priority;
    let tolerance = params.hole_tolerance;

    let block = {
        let locator = &*locator;
        let data = data.unwrap_or(locator);

        match probe(locator, data, address, primary, tolerance) {
            Some(block) if block.is_admissible() => Some(block),

            rejected => match probe(locator, data, address, primary.other(), tolerance) {
                Some(block) if block.is_admissible() => Some(block),
                fallback if !params.lossy => rejected.or(fallback).map(Block::forced),
                _ => None,
            },
        }
    }?;

    for ptr in block.cells() {
        locator[ptr] = 0;
    }

    Some(block)
}

/// Extracts every block of a frame in address order.
///
/// Only cells lying on pixel lines scheduled for this `pass` can start a
/// block (see [`Params::with_scan_stride`]).
pub fn extract_all(
    locator: &mut [u8; SCREEN_SIZE],
    data: Option<&[u8; SCREEN_SIZE]>,
    params: &Params,
    pass: usize,
) -> Vec<Block> {
    let stride = params.scan_stride as usize;
    let mut blocks = Vec::new();

    for address in 0..SCREEN_SIZE {
        if locator[address] == 0 || line_of(address) % stride != pass % stride {
            continue;
        }

        match extract(locator, data, address, params) {
            Some(block) => {
                trace!(
                    "block @{:#06x} {:?} x{}",
                    block.address,
                    block.shape,
                    block.len()
                );

                blocks.push(block);
            }

            None => {
                trace!("cell @{:#06x} deferred", address);
            }
        }
    }

    blocks
}
