use crate::*;
use std::collections::{BTreeMap, HashMap};

/// Sorts a frame's chunks by address.
///
/// A base is moved up to the slot of its first dependent (and ahead of it),
/// so its position is always known by the time a reference needs it.
pub fn order(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut first_use: HashMap<ChunkId, u16> = HashMap::new();

    for chunk in &chunks {
        if let Role::Reference(id) = chunk.role {
            let address = chunk.block.address();

            first_use
                .entry(id)
                .and_modify(|slot| *slot = (*slot).min(address))
                .or_insert(address);
        }
    }

    chunks.sort_by_key(|chunk| {
        let address = chunk.block.address();

        match chunk.role {
            Role::Base(id) => {
                let slot = first_use.get(&id).map_or(address, |&dep| dep.min(address));
                (slot, 0, address)
            }

            _ => (address, 1, address),
        }
    });

    chunks
}

/// What writing a frame did, so it can be undone.
#[derive(Debug, Default)]
pub struct Written {
    journal: Vec<(ChunkId, Option<usize>)>,
    pub records: BTreeMap<RecordKind, usize>,
}

impl Written {
    /// Restores every position the frame moved, newest first.
    pub fn undo(self, store: &mut Store) {
        for (id, position) in self.journal.into_iter().rev() {
            store.set_position(id, position);
        }
    }

    fn move_base(&mut self, store: &mut Store, id: ChunkId, position: usize) {
        let prev = store.set_position(id, Some(position));
        self.journal.push((id, prev));
    }

    fn count(&mut self, kind: RecordKind) {
        *self.records.entry(kind).or_default() += 1;
    }
}

/// Writes ordered chunks as records, without the end-of-frame marker.
pub fn write_frame(out: &mut Output, store: &mut Store, chunks: &[Chunk]) -> Written {
    let mut written = Written::default();

    for chunk in chunks {
        let block = &chunk.block;
        let start = out.len();

        match chunk.role {
            Role::Literal => {
                out.literal(block.address(), block.shape(), block.bytes());
                written.count(RecordKind::Literal);
            }

            Role::Base(id) => {
                written.move_base(store, id, start);
                out.literal(block.address(), block.shape(), block.bytes());
                written.count(RecordKind::Literal);
            }

            Role::Reference(id) => {
                let offset = store
                    .position(id)
                    .map_or(usize::MAX, |position| start - position);

                out.reference(block.address(), block.shape(), block.len(), offset);

                if offset < MAX_OFFSET {
                    trace!("@{:#06x} -> chunk #{} (-{})", block.address(), id, offset);
                    written.count(RecordKind::Reference);
                    continue;
                }

                // Base is out of reach: replace the reference with a literal
                // and, if it holds the whole pattern, let later references
                // point here instead.
                out.truncate(start);

                let pattern = &store.bytes(id)[..block.len()];
                out.literal(block.address(), block.shape(), pattern);

                if block.len() == store.bytes(id).len() {
                    written.move_base(store, id, start);
                }

                trace!("@{:#06x} chunk #{} out of reach", block.address(), id);
                written.count(RecordKind::Promoted);
            }
        }
    }

    written
}
