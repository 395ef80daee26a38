use crate::*;

/// Cuts the live buffer into pages and hands them over to the sink.
#[derive(Debug)]
pub struct Pager<S> {
    sink: S,
    name: String,
    limit: usize,
    pages: usize,
}

impl<S: Sink> Pager<S> {
    pub fn new(sink: S, name: impl Into<String>, limit: usize) -> Self {
        Self {
            sink,
            name: name.into(),
            limit,
            pages: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn page_name(&self, idx: usize) -> String {
        format!("{}{:03}.ani.bin", self.name, idx)
    }

    /// Flushes the first `len` bytes of `out`, which must end with an
    /// end-of-frame marker; the marker becomes a page marker. Recorded
    /// positions are shifted to stay relative to the live buffer.
    ///
    /// Returns the page's length.
    pub fn flush(&mut self, out: &mut Output, store: &mut Store, len: usize) -> usize {
        let mut page = out.take_front(len);

        if let Some(last) = page.last_mut() {
            debug_assert_eq!(*last, END_OF_FRAME);
            *last = PAGE_MARKER;
        }

        store.rebase(len);

        if page.len() > self.limit {
            warn!(
                "page {} holds a single frame of {} bytes, over the {} byte limit",
                self.pages,
                page.len(),
                self.limit
            );
        }

        self.persist(&page);
        page.len()
    }

    /// Persists whatever is left, which by now ends with the end-of-stream
    /// marker, and gives the sink back.
    pub fn finish(mut self, out: Output) -> (usize, S) {
        self.persist(out.as_bytes());
        (out.len(), self.sink)
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    fn persist(&mut self, page: &[u8]) {
        let name = self.page_name(self.pages);

        debug!("persisting `{}` ({} bytes)", name, page.len());

        // Losing a page is only noticed by whoever plays the stream back.
        if let Err(err) = self.sink.persist(&name, page) {
            warn!("couldn't persist `{}`: {:#}", name, err);
        }

        self.pages += 1;
    }
}
