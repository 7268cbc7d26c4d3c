/// Borrowed 8-bit grayscale view with an explicit stride.
///
/// The scanner hands sub-windows of a pyramid level to the scorer as views
/// sharing the level's backing buffer, so window extraction never copies.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Borrow a `w`×`h` sub-window with the top-left corner at (`x`, `y`).
    ///
    /// The view keeps the parent stride; the window must lie entirely inside
    /// the parent image.
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> ImageU8<'a> {
        assert!(
            x + w <= self.w && y + h <= self.h,
            "window {}x{} at ({x}, {y}) exceeds image {}x{}",
            w,
            h,
            self.w,
            self.h
        );
        ImageU8 {
            w,
            h,
            stride: self.stride,
            data: &self.data[y * self.stride + x..],
        }
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u8]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}
