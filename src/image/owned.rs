use super::{ImageU8, ImageView, ImageViewMut};

/// Owned 8-bit grayscale buffer with stride and borrowed view conversion.
///
/// Pyramid rendering reuses one of these as scratch across levels, so the
/// buffer can be re-dimensioned in place without reallocating when the new
/// level fits in the existing capacity.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer from raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert!(
            data.len() == width * height,
            "buffer length {} does not match {width}x{height}",
            data.len()
        );
        Self {
            width,
            height,
            stride: width,
            data,
        }
    }

    /// Zero-filled buffer of the given dimensions.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0; width * height])
    }

    /// Build a buffer by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Self {
        let mut out = Self::zeroed(width, height);
        for y in 0..height {
            let row = out.row_mut(y);
            for (x, px) in row.iter_mut().enumerate() {
                *px = f(x, y);
            }
        }
        out
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Re-dimension in place, reusing the allocation where possible.
    /// Pixel contents are unspecified afterwards.
    pub fn resize_to(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.stride = width;
        self.data.resize(width * height, 0);
    }

    /// Iterate rows top to bottom with mutable access.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let width = self.width;
        self.data
            .chunks_exact_mut(self.stride.max(1))
            .map(move |row| &mut row[..width])
    }

    /// Backing bytes in row-major order.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

impl ImageView for GrayImageU8 {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u8]> {
        Some(&self.data[..self.width * self.height])
    }
}

impl ImageViewMut for GrayImageU8 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let end = start + self.width;
        &mut self.data[start..end]
    }
}
