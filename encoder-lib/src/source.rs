use crate::*;
use ::image::io::Reader as ImageReader;
use std::fs;
use std::path::Path;

/// Frames of an animation, loaded in file-name order.
pub struct Source {
    screens: Vec<Screen>,
}

impl Source {
    /// Loads every file of `path`: `.scr` dumps as they are, anything else
    /// through the image decoder (it has to be 256x192).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let pattern = path.as_ref().join("*.*");
        let paths = glob::glob(&*pattern.to_string_lossy()).context("Couldn't find frames")?;

        let screens = paths.into_iter().map(|frame| {
            let path = frame.context("Couldn't find frame")?;

            Self::load(&path)
        });

        Ok(Self {
            screens: screens.collect::<Result<_>>()?,
        })
    }

    fn load(path: &Path) -> Result<Screen> {
        let is_scr = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("scr"));

        if is_scr {
            let bytes = fs::read(path)
                .with_context(|| format!("Couldn't open frame: {}", path.display()))?;

            return Screen::from_scr(&bytes)
                .with_context(|| format!("Couldn't decode frame: {}", path.display()));
        }

        let image = ImageReader::open(path)
            .with_context(|| format!("Couldn't open frame: {}", path.display()))?
            .decode()
            .with_context(|| format!("Couldn't decode frame: {}", path.display()))?;

        Screen::from_rgb(&image.to_rgb8())
            .with_context(|| format!("Couldn't convert frame: {}", path.display()))
    }

    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.screens.iter()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}
