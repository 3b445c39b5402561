//! Plot gallery
//!
//! An ordered buffer of normalized images with a single focused entry.
//! Appending always focuses the new image; `next`/`prev` saturate at the
//! ends. An empty gallery has no view and both navigation directions are
//! disabled.

use crate::interpreter::RawImage;
use std::fmt;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Encoding of a plot image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
    Unknown,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Svg => "SVG",
            ImageFormat::Unknown => "binary",
        };
        f.write_str(name)
    }
}

/// A plot in displayable form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotImage {
    pub format: ImageFormat,
    /// Pixel size, when the encoding carries it in its header
    pub dimensions: Option<(u32, u32)>,
    pub bytes: Vec<u8>,
}

impl PlotImage {
    /// Sniff the encoding of raw device output
    pub fn normalize(raw: RawImage) -> Self {
        let bytes = raw.bytes;
        let format = if bytes.starts_with(PNG_SIGNATURE) {
            ImageFormat::Png
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            ImageFormat::Jpeg
        } else if looks_like_svg(&bytes) {
            ImageFormat::Svg
        } else {
            ImageFormat::Unknown
        };

        let dimensions = match format {
            ImageFormat::Png => png_dimensions(&bytes),
            _ => None,
        };

        PlotImage {
            format,
            dimensions,
            bytes,
        }
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    String::from_utf8_lossy(head).contains("<svg")
}

/// Width and height from the IHDR chunk, which always follows the signature
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let ihdr = bytes.get(8..24)?;
    if &ihdr[4..8] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(ihdr[8..12].try_into().ok()?);
    let height = u32::from_be_bytes(ihdr[12..16].try_into().ok()?);
    Some((width, height))
}

/// The focused plot with its 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotView<'a> {
    pub image: &'a PlotImage,
    pub position: usize,
    pub total: usize,
}

/// Ordered plot buffer with a focused index
#[derive(Debug, Clone, Default)]
pub struct PlotGallery {
    plots: Vec<PlotImage>,
    current: usize,
}

impl PlotGallery {
    pub fn new() -> Self {
        PlotGallery {
            plots: Vec::new(),
            current: 0,
        }
    }

    /// Add a plot and focus it
    pub fn append(&mut self, image: PlotImage) {
        self.plots.push(image);
        self.current = self.plots.len() - 1;
    }

    pub fn clear(&mut self) {
        self.plots.clear();
        self.current = 0;
    }

    pub fn next(&mut self) {
        if self.can_next() {
            self.current += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.can_prev() {
            self.current -= 1;
        }
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.plots.len()
    }

    pub fn can_prev(&self) -> bool {
        !self.plots.is_empty() && self.current > 0
    }

    /// The focused plot, or `None` while the gallery is empty
    pub fn current_view(&self) -> Option<PlotView<'_>> {
        self.plots.get(self.current).map(|image| PlotView {
            image,
            position: self.current + 1,
            total: self.plots.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> RawImage {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        RawImage { bytes }
    }

    fn plot(tag: u8) -> PlotImage {
        PlotImage::normalize(RawImage { bytes: vec![tag] })
    }

    #[test]
    fn png_header_yields_dimensions() {
        let image = PlotImage::normalize(png(800, 600));
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.dimensions, Some((800, 600)));
    }

    #[test]
    fn other_formats_are_sniffed() {
        let svg = PlotImage::normalize(RawImage {
            bytes: b"<?xml version=\"1.0\"?>\n<svg width=\"10\"/>".to_vec(),
        });
        assert_eq!(svg.format, ImageFormat::Svg);
        assert_eq!(svg.dimensions, None);

        let jpeg = PlotImage::normalize(RawImage {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        });
        assert_eq!(jpeg.format, ImageFormat::Jpeg);

        assert_eq!(plot(1).format, ImageFormat::Unknown);
    }

    #[test]
    fn newest_plot_takes_focus() {
        let mut gallery = PlotGallery::new();
        for n in 1..=4u8 {
            gallery.append(plot(n));
            let view = gallery.current_view().expect("non-empty");
            assert_eq!(view.position, view.total);
            assert_eq!(view.image.bytes, vec![n]);
        }
    }

    #[test]
    fn navigation_saturates_at_both_ends() {
        let mut gallery = PlotGallery::new();
        gallery.append(plot(1));
        gallery.append(plot(2));
        gallery.append(plot(3));

        gallery.next();
        assert_eq!(gallery.current_view().map(|v| v.position), Some(3));
        assert!(!gallery.can_next());

        gallery.prev();
        gallery.prev();
        gallery.prev();
        assert_eq!(gallery.current_view().map(|v| v.position), Some(1));
        assert!(!gallery.can_prev());
        assert!(gallery.can_next());
    }

    #[test]
    fn clear_empties_and_disables_navigation() {
        let mut gallery = PlotGallery::new();
        gallery.append(plot(1));
        gallery.append(plot(2));
        gallery.clear();

        assert!(gallery.current_view().is_none());
        assert!(!gallery.can_prev());
        assert!(!gallery.can_next());
        gallery.next();
        gallery.prev();
        assert!(gallery.current_view().is_none());

        gallery.append(plot(3));
        let view = gallery.current_view().expect("non-empty");
        assert_eq!((view.position, view.total), (1, 1));
    }
}
