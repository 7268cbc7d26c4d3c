//! Row-oriented access shared by the borrowed and owned grayscale types.

pub trait ImageView {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    fn row(&self, y: usize) -> &[u8];

    /// Iterate rows top to bottom.
    fn rows(&self) -> impl Iterator<Item = &[u8]>
    where
        Self: Sized,
    {
        (0..self.height()).map(move |y| self.row(y))
    }

    fn is_contiguous(&self) -> bool {
        self.stride() == self.width()
    }

    fn as_slice(&self) -> Option<&[u8]> {
        None
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [u8];
}
