use crate::*;
use std::collections::HashMap;

pub type ChunkId = usize;

/// Pattern stored literally somewhere in the stream and available for
/// back-references.
#[derive(Debug)]
struct Stored {
    bytes: Vec<u8>,

    /// Start of the literal record in the live buffer; `None` until written,
    /// or after its page got flushed.
    position: Option<usize>,
}

/// Stream-wide pattern map; lives as long as the encoder.
#[derive(Debug, Default)]
pub struct Store {
    chunks: Vec<Stored>,
    index: HashMap<Vec<u8>, ChunkId>,
}

impl Store {
    pub fn find(&self, bytes: &[u8]) -> Option<ChunkId> {
        self.index.get(bytes).copied()
    }

    pub fn register(&mut self, bytes: &[u8]) -> ChunkId {
        let id = self.chunks.len();

        self.chunks.push(Stored {
            bytes: bytes.to_vec(),
            position: None,
        });

        self.index.insert(bytes.to_vec(), id);
        id
    }

    pub fn bytes(&self, id: ChunkId) -> &[u8] {
        &self.chunks[id].bytes
    }

    pub fn position(&self, id: ChunkId) -> Option<usize> {
        self.chunks[id].position
    }

    /// Returns the previous position.
    pub(crate) fn set_position(&mut self, id: ChunkId, position: Option<usize>) -> Option<usize> {
        std::mem::replace(&mut self.chunks[id].position, position)
    }

    /// Shifts every position after `len` bytes got cut off the front of the
    /// live buffer.
    pub(crate) fn rebase(&mut self, len: usize) {
        for chunk in &mut self.chunks {
            chunk.position = chunk.position.and_then(|pos| pos.checked_sub(len));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Literal,

    /// Literal which later records refer back to.
    Base(ChunkId),

    Reference(ChunkId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub block: Block,
    pub role: Role,
}

impl Chunk {
    fn new(block: Block, role: Role) -> Self {
        Self { block, role }
    }
}

/// Patterns this short cost as much as a reference record.
const MIN_REFERENCE_LEN: usize = 3;

/// Groups one frame's blocks by payload and decides which of them are stored
/// literally and which refer back to a stored pattern.
pub fn dedupe(blocks: Vec<Block>, store: &mut Store) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(blocks.len());

    for group in group(blocks) {
        let mut members = group.into_iter();

        let base = match members.next() {
            Some(base) => base,
            None => continue,
        };

        let members: Vec<_> = members.collect();

        let (base_role, target) = match store.find(base.bytes()) {
            Some(id) if base.len() >= MIN_REFERENCE_LEN => (Role::Reference(id), Some(id)),

            // Registered even when every sibling is too short to refer to it;
            // later frames may still repeat the whole pattern.
            None if !members.is_empty() && base.len() >= MIN_REFERENCE_LEN => {
                let id = store.register(base.bytes());
                (Role::Base(id), Some(id))
            }

            _ => (Role::Literal, None),
        };

        chunks.push(Chunk::new(base, base_role));

        for block in members {
            let role = match target {
                Some(id) if block.len() >= MIN_REFERENCE_LEN => Role::Reference(id),
                _ => Role::Literal,
            };

            chunks.push(Chunk::new(block, role));
        }
    }

    chunks
}

/// Buckets blocks by payload, then folds every bucket whose payload is a
/// prefix of another one into it. The first block of a resulting group always
/// carries the longest payload, so every other member is a prefix of it.
fn group(blocks: Vec<Block>) -> Vec<Vec<Block>> {
    let mut index: HashMap<Vec<u8>, usize> = HashMap::new();
    let mut buckets: Vec<Vec<Block>> = Vec::new();

    for block in blocks {
        match index.get(block.bytes()) {
            Some(&idx) => buckets[idx].push(block),

            None => {
                index.insert(block.bytes().to_vec(), buckets.len());
                buckets.push(vec![block]);
            }
        }
    }

    // In lexicographic order, a payload which prefixes any later payload
    // prefixes its direct successor as well, so each bucket only needs to
    // look one step ahead to find the group it belongs to.
    let mut sorted: Vec<usize> = (0..buckets.len()).collect();
    sorted.sort_by(|&a, &b| buckets[a][0].bytes().cmp(buckets[b][0].bytes()));

    let mut root: Vec<usize> = (0..buckets.len()).collect();

    for pos in (0..sorted.len().saturating_sub(1)).rev() {
        let (curr, next) = (sorted[pos], sorted[pos + 1]);

        if buckets[next][0].bytes().starts_with(buckets[curr][0].bytes()) {
            root[curr] = root[next];
        }
    }

    let mut merged: Vec<Option<Vec<Block>>> = buckets.into_iter().map(Some).collect();

    // Roots never move, so every bucket can go straight to its root.
    for &idx in sorted.iter().rev() {
        if root[idx] != idx {
            if let Some(members) = merged[idx].take() {
                if let Some(group) = merged[root[idx]].as_mut() {
                    group.extend(members);
                }
            }
        }
    }

    merged.into_iter().flatten().collect()
}
