mod colorizer;
mod to_png;

pub use colorizer::{Breakpoint, Breakpoints, ColorMapper, Colorizer, RgbaColor};
pub use to_png::{ToPng, default_matrix_image_creator};
