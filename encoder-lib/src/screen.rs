use crate::*;
use ::image::{Pixel, RgbImage};

/// Size of the bitmap part of a ZX Spectrum screen.
pub const SCREEN_SIZE: usize = 6144;
pub const SCREEN_WIDTH: u32 = 256;
pub const SCREEN_HEIGHT: u32 = 192;

/// Size of a full `.scr` dump (bitmap followed by 768 attribute bytes).
pub const SCR_FILE_SIZE: usize = 6912;

/// Single monochrome frame, 8 horizontal pixels per byte, rows folded into
/// screen thirds the way the Spectrum's video memory lays them out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    bytes: Box<[u8; SCREEN_SIZE]>,
}

impl Screen {
    pub fn blank() -> Self {
        Self {
            bytes: Box::new([0; SCREEN_SIZE]),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() == SCREEN_SIZE,
            "Expected {} bytes of bitmap, got {}",
            SCREEN_SIZE,
            bytes.len()
        );

        let mut this = Self::blank();
        this.bytes.copy_from_slice(bytes);

        Ok(this)
    }

    /// Takes the bitmap out of a `.scr` dump; the attribute area, if present,
    /// is ignored.
    pub fn from_scr(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() == SCREEN_SIZE || bytes.len() == SCR_FILE_SIZE,
            "Not a screen dump: {} bytes",
            bytes.len()
        );

        Self::from_bytes(&bytes[..SCREEN_SIZE])
    }

    pub fn from_rgb(img: &RgbImage) -> Result<Self> {
        ensure!(
            img.width() == SCREEN_WIDTH && img.height() == SCREEN_HEIGHT,
            "Expected a {}x{} image, got {}x{}",
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            img.width(),
            img.height()
        );

        let mut this = Self::blank();
        let mut hl = 0;

        for y in 0..SCREEN_HEIGHT {
            for (col, x0) in (0..SCREEN_WIDTH).step_by(8).enumerate() {
                this.bytes[hl + col] = (0..8).fold(0u8, |byte, bit| {
                    let p = {
                        let p = img.get_pixel(x0 + bit, y);
                        let r = p.channels()[0] as f32;
                        let g = p.channels()[1] as f32;
                        let b = p.channels()[2] as f32;

                        (r + g + b) / 3.0 / 255.0
                    };

                    if p >= 0.5 {
                        byte | (0x80 >> bit)
                    } else {
                        byte
                    }
                });
            }

            hl = down_hl(hl);
        }

        Ok(this)
    }

    /// Full `.scr` dump of this screen, every attribute set to `attr`.
    pub fn to_scr(&self, attr: u8) -> Vec<u8> {
        let mut dump = Vec::with_capacity(SCR_FILE_SIZE);

        dump.extend_from_slice(&self.bytes[..]);
        dump.resize(SCR_FILE_SIZE, attr);
        dump
    }

    /// Clears every byte with exactly one pixel set; such specks are mostly
    /// dithering noise and cost a whole record each.
    pub fn remove_minor_bytes(&mut self) {
        for byte in self.bytes.iter_mut() {
            if byte.is_power_of_two() {
                *byte = 0;
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; SCREEN_SIZE] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; SCREEN_SIZE] {
        &mut self.bytes
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::blank()
    }
}

/// Moves a bitmap offset one pixel line down (the `DOWN HL` routine).
pub fn down_hl(hl: usize) -> usize {
    let mut h = hl >> 8;
    let mut l = hl & 0xff;

    h += 1;

    if h & 7 == 0 {
        l += 32;

        if l < 256 {
            h -= 8;
        }
    }

    (h << 8) | (l & 0xff)
}

/// Pixel line (0..192) a bitmap offset belongs to.
pub fn line_of(address: usize) -> usize {
    let third = (address >> 11) & 3;
    let row = (address >> 5) & 7;
    let line = (address >> 8) & 7;

    third * 64 + row * 8 + line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_hl_walks_every_line_once() {
        let mut hl = 0;
        let mut seen = vec![false; SCREEN_HEIGHT as usize];

        for y in 0..SCREEN_HEIGHT as usize {
            assert_eq!(hl & 31, 0);
            assert_eq!(line_of(hl), y);
            assert!(!seen[y]);

            seen[y] = true;
            hl = down_hl(hl);
        }

        assert_eq!(hl, SCREEN_SIZE);
    }

    #[test]
    fn down_hl_crosses_character_rows_and_thirds() {
        assert_eq!(down_hl(0x0000), 0x0100);
        assert_eq!(down_hl(0x0700), 0x0020);
        assert_eq!(down_hl(0x07e0), 0x0800);
        assert_eq!(down_hl(0x0fe0), 0x1000);
    }

    #[test]
    fn scr_dump_keeps_only_the_bitmap() {
        let mut dump = vec![0x38; SCR_FILE_SIZE];
        dump[..SCREEN_SIZE].iter_mut().for_each(|b| *b = 0xaa);

        let screen = Screen::from_scr(&dump).unwrap();

        assert!(screen.as_bytes().iter().all(|&b| b == 0xaa));
        assert!(Screen::from_scr(&dump[..100]).is_err());
    }

    #[test]
    fn scr_dump_is_filled_with_attributes() {
        let mut screen = Screen::blank();
        screen.as_bytes_mut()[0] = 0x81;

        let dump = screen.to_scr(0x38);

        assert_eq!(dump.len(), SCR_FILE_SIZE);
        assert_eq!(dump[0], 0x81);
        assert!(dump[SCREEN_SIZE..].iter().all(|&b| b == 0x38));
        assert_eq!(Screen::from_scr(&dump).unwrap(), screen);
    }

    #[test]
    fn minor_bytes_are_removed() {
        let mut screen = Screen::blank();
        screen.as_bytes_mut()[..5].copy_from_slice(&[0x80, 0x01, 0x03, 0xff, 0x10]);

        screen.remove_minor_bytes();

        assert_eq!(&screen.as_bytes()[..5], &[0, 0, 0x03, 0xff, 0]);
    }

    #[test]
    fn rgb_frames_are_thresholded_into_folded_rows() {
        let mut img = RgbImage::new(SCREEN_WIDTH, SCREEN_HEIGHT);

        // first pixel of line 1 and last pixel of line 8
        img.put_pixel(0, 1, ::image::Rgb([255, 255, 255]));
        img.put_pixel(255, 8, ::image::Rgb([200, 200, 200]));
        img.put_pixel(1, 1, ::image::Rgb([10, 10, 10]));

        let screen = Screen::from_rgb(&img).unwrap();
        let bytes = screen.as_bytes();

        assert_eq!(bytes[0x0100], 0x80);
        assert_eq!(bytes[0x0020 + 31], 0x01);
        assert_eq!(bytes.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn rgb_frames_must_be_full_screen() {
        let img = RgbImage::new(84, 48);

        assert!(Screen::from_rgb(&img).is_err());
    }
}
