use crate::operations::image::{Colorizer, RgbaColor};
use crate::util::Result;
use image::{DynamicImage, ImageFormat, RgbaImage};
use ndarray::Array2;
use num_traits::AsPrimitive;
use std::io::Cursor;

pub trait ToPng {
    /// Outputs png bytes of an image of size width x height
    fn to_png(&self, width: u32, height: u32, colorizer: &Colorizer) -> Vec<u8>;
}

impl<T> ToPng for Array2<T>
where
    T: AsPrimitive<f64> + Copy,
{
    fn to_png(&self, width: u32, height: u32, colorizer: &Colorizer) -> Vec<u8> {
        // cells are looked up nearest-neighbor, so the cell grid fills the image
        let scale_x = (self.ncols() as f64) / f64::from(width);
        let scale_y = (self.nrows() as f64) / f64::from(height);

        let color_mapper = colorizer.create_color_mapper();

        let image_buffer: RgbaImage = RgbaImage::from_fn(width, height, |x, y| {
            let cell_x = (((f64::from(x) + 0.5) * scale_x) - 0.5).round() as usize;
            let cell_y = (((f64::from(y) + 0.5) * scale_y) - 0.5).round() as usize;

            let cell_value: f64 = self
                .get([cell_y, cell_x])
                .map_or(f64::NAN, |value| value.as_());

            color_mapper.call(cell_value).into()
        });

        let mut buffer = Cursor::new(Vec::new());

        let _ = DynamicImage::ImageRgba8(image_buffer).write_to(&mut buffer, ImageFormat::Png);

        buffer.into_inner()
    }
}

/// Builds the default image creator for confusion matrices: a white→blue
/// linear gradient over the observed count range, rendered as a square PNG
/// of `size` pixels. An empty matrix renders as a single no-data cell.
pub fn default_matrix_image_creator(size: u32) -> impl Fn(&Array2<f64>) -> Result<Vec<u8>> {
    move |matrix: &Array2<f64>| {
        let max_cell = matrix.iter().copied().fold(0., f64::max).max(1.);

        let colorizer = Colorizer::linear_gradient(
            vec![
                (0.0, RgbaColor::white()).try_into()?,
                (max_cell, RgbaColor::new(8, 48, 107, 255)).try_into()?,
            ],
            RgbaColor::transparent(),
            RgbaColor::transparent(),
        )?;

        if matrix.is_empty() {
            return Ok(Array2::<f64>::from_elem((1, 1), f64::NAN).to_png(size, size, &colorizer));
        }

        Ok(matrix.to_png(size, size, &colorizer))
    }
}
