mod block;
mod chunk;
mod delta;
mod pager;
mod params;
mod record;
mod screen;
mod sink;
mod source;
mod stats;
mod writer;

use self::{chunk::*, delta::*, pager::*, writer::*};
use anyhow::{ensure, Context, Result};
use log::{debug, trace, warn};

pub use self::{
    block::{extract, extract_all, probe, Block, Shape},
    params::*,
    record::*,
    screen::*,
    sink::*,
    source::*,
    stats::*,
};

/// Turns a sequence of screens into an animation stream.
///
/// The first screen is only remembered: the player is expected to show it
/// before starting the stream. Every following screen produces one frame of
/// records terminated by [`END_OF_FRAME`]. [`Encoder::finish`] writes
/// [`END_OF_STREAM`] and persists the last page; dropping the encoder
/// without finishing it loses the buffered frames.
#[derive(Debug)]
pub struct Encoder<'a, S: Sink> {
    params: &'a Params,
    stats: Stats,
    differ: Differ,
    store: Store,
    output: Output,
    pager: Pager<S>,
    first: Option<Screen>,
    passes: usize,
}

impl<'a, S: Sink> Encoder<'a, S> {
    pub fn new(params: &'a Params, name: impl Into<String>, sink: S) -> Self {
        Self {
            params,
            stats: Default::default(),
            differ: Differ::new(),
            store: Default::default(),
            output: Default::default(),
            pager: Pager::new(sink, name, params.page_size),
            first: Default::default(),
            passes: 0,
        }
    }

    /// Takes the next screen; in lossy mode its single-pixel bytes are
    /// dropped first.
    pub fn add(&mut self, curr: &Screen) {
        let filtered;

        let curr = if self.params.lossy {
            let mut screen = curr.clone();
            screen.remove_minor_bytes();

            filtered = screen;
            &filtered
        } else {
            curr
        };

        if self.first.is_none() {
            debug!("frame 0: initial screen");
            self.first = Some(curr.clone());
        }

        self.stats.frames += 1;
        self.step(curr);
    }

    /// Bytes waiting for the next page flush.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn finish(mut self) -> (Stats, S) {
        if self.params.looped && self.passes > 0 {
            if let Some(first) = self.first.take() {
                debug!("closing the loop");
                self.step(&first);
            }
        }

        self.output.push(END_OF_STREAM);

        let pages = self.pager.pages();
        let (len, sink) = self.pager.finish(self.output);

        self.stats.pages = pages + 1;
        self.stats.bytes += len;

        (self.stats, sink)
    }

    fn step(&mut self, curr: &Screen) {
        let pass = self.passes;

        let blocks = match self.differ.diff(curr) {
            Some(changes) => changes.extract(self.params, pass),
            None => return,
        };

        self.passes += 1;

        let found = blocks.len();
        let chunks = order(dedupe(blocks, &mut self.store));

        let mut start = self.output.len();
        let mut written = write_frame(&mut self.output, &mut self.store, &chunks);
        self.output.push(END_OF_FRAME);

        // The frame didn't fit: move everything before it into a page and
        // write it again into the emptied buffer, where references to
        // flushed bases get resolved into literals.
        if self.output.len() > self.pager.limit() && start > 0 {
            self.output.truncate(start);
            written.undo(&mut self.store);
            self.flush(start);

            start = 0;
            written = write_frame(&mut self.output, &mut self.store, &chunks);
            self.output.push(END_OF_FRAME);
        }

        let bytes = self.output.len() - start;

        if self.output.len() >= self.pager.limit() {
            self.flush(self.output.len());
        }

        debug!(
            "frame {}: {} blocks, {} bytes, {} pending",
            pass + 1,
            found,
            bytes,
            self.differ.pending()
        );

        self.stats.add_records(&written.records);
    }

    fn flush(&mut self, len: usize) {
        let len = self.pager.flush(&mut self.output, &mut self.store, len);

        self.stats.bytes += len;
    }
}
