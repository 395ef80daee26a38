use crate::*;

/// Largest page the player is able to map in at once.
pub const MAX_PAGE_SIZE: usize = 16384;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WritePolicy {
    /// Records carry `prev ^ curr`; the player XORs them into video memory.
    Xor,

    /// Records carry the new bytes; the player overwrites video memory.
    Direct,
}

#[derive(Clone, Debug)]
pub struct Params {
    pub(crate) hole_tolerance: u8,
    pub(crate) shape_priority: Shape,
    pub(crate) write_policy: WritePolicy,
    pub(crate) lossy: bool,
    pub(crate) scan_stride: u8,
    pub(crate) looped: bool,
    pub(crate) page_size: usize,
}

impl Params {
    pub fn new(
        hole_tolerance: u8,
        shape_priority: Shape,
        write_policy: WritePolicy,
    ) -> Result<Self> {
        ensure!(
            hole_tolerance <= 7,
            "Hole tolerance must be within 0..=7, got {}",
            hole_tolerance
        );

        Ok(Self {
            hole_tolerance,
            shape_priority,
            write_policy,
            ..Default::default()
        })
    }

    /// Clears single-pixel bytes off every screen and lets the extractor drop
    /// runs shorter than their shape's minimum; the dropped changes are
    /// retried on following frames.
    pub fn with_lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    /// Only every `stride`-th pixel line is scanned per frame, rotating
    /// through the lines frame by frame.
    pub fn with_scan_stride(mut self, stride: u8) -> Result<Self> {
        ensure!(stride >= 1, "Scan stride must be at least 1");

        self.scan_stride = stride;
        Ok(self)
    }

    /// Appends a transition from the last frame back to the first one.
    pub fn with_loop(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        ensure!(
            (16..=MAX_PAGE_SIZE).contains(&page_size),
            "Page size must be within 16..={}, got {}",
            MAX_PAGE_SIZE,
            page_size
        );

        self.page_size = page_size;
        Ok(self)
    }

    pub fn hole_tolerance(&self) -> u8 {
        self.hole_tolerance
    }

    pub fn shape_priority(&self) -> Shape {
        self.shape_priority
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn lossy(&self) -> bool {
        self.lossy
    }

    pub fn scan_stride(&self) -> u8 {
        self.scan_stride
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            hole_tolerance: 2,
            shape_priority: Shape::Vertical,
            write_policy: WritePolicy::Xor,
            lossy: false,
            scan_stride: 1,
            looped: true,
            page_size: MAX_PAGE_SIZE,
        }
    }
}
