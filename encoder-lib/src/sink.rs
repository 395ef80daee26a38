use crate::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Destination of finished pages.
pub trait Sink {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).persist(name, bytes)
    }
}

#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        fs::create_dir_all(dir)
            .with_context(|| format!("Couldn't create output directory: {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }
}

impl Sink for DirSink {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(name);

        fs::write(&path, bytes)
            .with_context(|| format!("Couldn't write page: {}", path.display()))
    }
}

/// Keeps pages around, e.g. to compare several encodings before picking one.
#[derive(Debug, Default)]
pub struct MemorySink {
    pages: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn pages(&self) -> &[(String, Vec<u8>)] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<(String, Vec<u8>)> {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|(_, page)| page.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Replays every page into another sink.
    pub fn replay(&self, sink: &mut impl Sink) -> Result<()> {
        for (name, page) in &self.pages {
            sink.persist(name, page)?;
        }

        Ok(())
    }
}

impl Sink for MemorySink {
    fn persist(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.pages.push((name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path().join("out")).unwrap();

        sink.persist("anim000.ani.bin", &[0, 1]).unwrap();

        let bytes = fs::read(dir.path().join("out/anim000.ani.bin")).unwrap();
        assert_eq!(bytes, vec![0, 1]);
    }

    #[test]
    fn dir_sink_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path()).unwrap();

        assert!(sink.persist("missing/page.bin", &[1]).is_err());
    }

    #[test]
    fn memory_sink_replays_in_order() {
        let mut first = MemorySink::default();
        first.persist("a", &[1]).unwrap();
        first.persist("b", &[2, 3]).unwrap();

        let mut second = MemorySink::default();
        first.replay(&mut second).unwrap();

        assert_eq!(second.pages(), first.pages());
        assert_eq!(second.len(), 3);
    }
}
