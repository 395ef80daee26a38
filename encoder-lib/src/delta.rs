use crate::*;

/// Keeps the previous frame and the change accumulator.
///
/// The accumulator is never reset between frames: cells which the extractor
/// leaves alone (lossy mode, skipped scan lines) stay set and are picked up
/// by a later pass.
#[derive(Debug)]
pub struct Differ {
    prev: Option<Screen>,
    changes: Screen,
}

/// Borrowed view handed to the extractor after a successful diff.
pub struct Changes<'a> {
    pub locator: &'a mut [u8; SCREEN_SIZE],
    pub frame: &'a Screen,
}

impl Differ {
    pub fn new() -> Self {
        Self {
            prev: None,
            changes: Screen::blank(),
        }
    }

    /// Folds `curr` into the accumulator; returns `None` for the very first
    /// frame, which has nothing to be compared against.
    pub fn diff(&mut self, curr: &Screen) -> Option<Changes<'_>> {
        let prev = self.prev.replace(curr.clone())?;

        for ((acc, a), b) in self
            .changes
            .as_bytes_mut()
            .iter_mut()
            .zip(curr.as_bytes().iter())
            .zip(prev.as_bytes().iter())
        {
            *acc ^= a ^ b;
        }

        Some(Changes {
            locator: self.changes.as_bytes_mut(),
            frame: self.prev.as_ref()?,
        })
    }

    pub fn pending(&self) -> usize {
        self.changes.as_bytes().iter().filter(|&&b| b != 0).count()
    }
}

impl Changes<'_> {
    pub fn extract(self, params: &Params, pass: usize) -> Vec<Block> {
        let data = match params.write_policy {
            WritePolicy::Xor => None,
            WritePolicy::Direct => Some(self.frame.as_bytes()),
        };

        extract_all(self.locator, data, params, pass)
    }
}
