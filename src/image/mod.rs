pub mod io;
pub mod owned;
pub mod resize;
pub mod traits;
pub mod u8;

pub use self::owned::GrayImageU8;
pub use self::resize::resize_bilinear_into;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::u8::ImageU8;
