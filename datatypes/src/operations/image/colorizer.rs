use crate::error;
use crate::util::Result;
use float_cmp::approx_eq;
use ordered_float::{FloatIsNan, NotNan};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::convert::TryFrom;

/// A colorizer specifies a mapping between matrix values and an output image
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Colorizer {
    LinearGradient {
        breakpoints: Breakpoints,
        no_data_color: RgbaColor,
        default_color: RgbaColor,
    },
    LogarithmicGradient {
        breakpoints: Breakpoints,
        no_data_color: RgbaColor,
        default_color: RgbaColor,
    },
}

impl Colorizer {
    /// A linear gradient linearly interpolates values within breakpoints of a color table
    pub fn linear_gradient(
        breakpoints: Breakpoints,
        no_data_color: RgbaColor,
        default_color: RgbaColor,
    ) -> Result<Self> {
        ensure!(
            breakpoints.len() >= 2,
            error::Colorizer {
                details: "Linear Gradient Colorizer must have a least two breakpoints"
            }
        );

        let colorizer = Self::LinearGradient {
            breakpoints,
            no_data_color,
            default_color,
        };

        ensure!(
            colorizer.min_value() < colorizer.max_value()
                && !approx_eq!(f64, colorizer.min_value(), colorizer.max_value()),
            error::Colorizer {
                details: "A colorizer's min value must be smaller than its max value"
            }
        );

        Ok(colorizer)
    }

    /// A logarithmic gradient logarithmically interpolates values within breakpoints of a color
    /// table and allows only positive values
    pub fn logarithmic_gradient(
        breakpoints: Breakpoints,
        no_data_color: RgbaColor,
        default_color: RgbaColor,
    ) -> Result<Self> {
        ensure!(
            breakpoints.len() >= 2,
            error::Colorizer {
                details: "A log-scale gradient colorizer must have a least two breakpoints"
            }
        );

        let colorizer = Self::LogarithmicGradient {
            breakpoints,
            no_data_color,
            default_color,
        };

        ensure!(
            colorizer.min_value() > 0.,
            error::Colorizer {
                details: "A log-scale colorizer's min value must be positive"
            }
        );
        ensure!(
            colorizer.min_value() < colorizer.max_value()
                && !approx_eq!(f64, colorizer.min_value(), colorizer.max_value()),
            error::Colorizer {
                details: "A colorizer's min value must be smaller than its max value"
            }
        );

        Ok(colorizer)
    }

    /// Returns the minimum value that is covered by this colorizer
    pub fn min_value(&self) -> f64 {
        match self {
            Self::LinearGradient { breakpoints, .. }
            | Self::LogarithmicGradient { breakpoints, .. } => *breakpoints[0].value,
        }
    }

    /// Returns the maximum value that is covered by this colorizer
    pub fn max_value(&self) -> f64 {
        match self {
            Self::LinearGradient { breakpoints, .. }
            | Self::LogarithmicGradient { breakpoints, .. } => {
                *breakpoints[breakpoints.len() - 1].value
            }
        }
    }

    /// Returns the no data color of this colorizer
    pub fn no_data_color(&self) -> RgbaColor {
        match self {
            Self::LinearGradient { no_data_color, .. }
            | Self::LogarithmicGradient { no_data_color, .. } => *no_data_color,
        }
    }

    /// Creates a function for mapping matrix values to colors
    pub fn create_color_mapper(&self) -> ColorMapper {
        const COLOR_TABLE_SIZE: usize = 254; // use 256 colors with no data and default colors

        let (min_value, max_value) = (self.min_value(), self.max_value());

        let (Self::LinearGradient {
            no_data_color,
            default_color,
            ..
        }
        | Self::LogarithmicGradient {
            no_data_color,
            default_color,
            ..
        }) = self;

        ColorMapper {
            color_table: self.color_table(COLOR_TABLE_SIZE, min_value, max_value),
            min_value,
            max_value,
            no_data_color: *no_data_color,
            default_color: *default_color,
        }
    }

    /// Creates a color table of `number_of_colors` colors
    fn color_table(&self, number_of_colors: usize, min: f64, max: f64) -> Vec<RgbaColor> {
        let (Self::LinearGradient { breakpoints, .. }
        | Self::LogarithmicGradient { breakpoints, .. }) = self;

        let smallest_breakpoint_value = *breakpoints[0].value;
        let largest_breakpoint_value = *breakpoints[breakpoints.len() - 1].value;

        let first_color = breakpoints[0].color;
        let last_color = breakpoints[breakpoints.len() - 1].color;

        let step = (max - min) / ((number_of_colors - 1) as f64);

        let mut breakpoint_iter = breakpoints.iter();
        let mut breakpoint_prev = breakpoint_iter.next().expect("must have first entry");
        let mut breakpoint_next = breakpoint_iter.next().expect("must have second entry");

        let color_table: Vec<RgbaColor> = std::iter::successors(Some(min), |v| Some(v + step))
            .take(number_of_colors)
            .map(|value| {
                if value < smallest_breakpoint_value {
                    first_color // use these because of potential rounding errors instead of default color
                } else if value > largest_breakpoint_value {
                    last_color // use these because of potential rounding errors instead of default color
                } else {
                    while value > *breakpoint_next.value {
                        breakpoint_prev = breakpoint_next;
                        breakpoint_next = breakpoint_iter
                            .next()
                            .expect("if-condition must ensure this");
                    }

                    let prev_value = *breakpoint_prev.value;
                    let next_value = *breakpoint_next.value;

                    let prev_color = breakpoint_prev.color;
                    let next_color = breakpoint_next.color;

                    let fraction = match self {
                        Self::LinearGradient { .. } => {
                            (value - prev_value) / (next_value - prev_value)
                        }
                        Self::LogarithmicGradient { .. } => {
                            let nominator = f64::log10(value) - f64::log10(prev_value);
                            let denominator = f64::log10(next_value) - f64::log10(prev_value);
                            nominator / denominator
                        }
                    };

                    prev_color.factor_add(next_color, fraction)
                }
            })
            .collect();

        debug_assert_eq!(color_table.len(), number_of_colors);

        color_table
    }
}

/// A `ColorMapper` is a function for mapping matrix values to colors
pub struct ColorMapper {
    color_table: Vec<RgbaColor>,
    min_value: f64,
    max_value: f64,
    no_data_color: RgbaColor,
    default_color: RgbaColor,
}

impl ColorMapper {
    /// Map a matrix value to a color from the colorizer
    pub fn call(&self, value: f64) -> RgbaColor {
        if f64::is_nan(value) {
            self.no_data_color
        } else if value < self.min_value || value > self.max_value {
            self.default_color
        } else {
            let color_table_factor = (self.color_table.len() - 1) as f64;
            let table_entry = f64::round(
                color_table_factor * ((value - self.min_value) / (self.max_value - self.min_value)),
            ) as usize;
            *self
                .color_table
                .get(table_entry)
                .unwrap_or(&self.default_color)
        }
    }
}

/// A container type for breakpoints that specify a value to color mapping
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub value: NotNan<f64>,
    pub color: RgbaColor,
}

impl From<(NotNan<f64>, RgbaColor)> for Breakpoint {
    fn from(tuple: (NotNan<f64>, RgbaColor)) -> Self {
        Self {
            value: tuple.0,
            color: tuple.1,
        }
    }
}

impl TryFrom<(f64, RgbaColor)> for Breakpoint {
    type Error = FloatIsNan;

    fn try_from(tuple: (f64, RgbaColor)) -> Result<Self, Self::Error> {
        Ok(Self {
            value: NotNan::new(tuple.0)?,
            color: tuple.1,
        })
    }
}

/// A list of (value, color) tuples.
///
/// It is assumed to be ordered ascending and has at least two entries,
/// although we only check the first and last value for performance reasons.
pub type Breakpoints = Vec<Breakpoint>;

/// `RgbaColor` defines a 32 bit RGB color with alpha value
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RgbaColor([u8; 4]);

impl RgbaColor {
    /// Creates a new color from red, green, blue and alpha values
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        RgbaColor([red, green, blue, alpha])
    }

    pub fn transparent() -> Self {
        RgbaColor::new(0, 0, 0, 0)
    }

    pub fn black() -> Self {
        RgbaColor::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        RgbaColor::new(255, 255, 255, 255)
    }

    pub fn pink() -> Self {
        RgbaColor::new(255, 0, 255, 255)
    }

    /// Adds another color with a factor in [0, 1] to this color.
    /// The current color remains in (1 - factor)
    ///
    /// # Example
    ///
    /// ```
    /// use continuum_datatypes::operations::image::RgbaColor;
    ///
    /// assert_eq!(RgbaColor::black().factor_add(RgbaColor::white(), 0.5), RgbaColor::new(128, 128, 128, 255));
    /// ```
    pub fn factor_add(self, other: Self, factor: f64) -> Self {
        debug_assert!((0. ..=1.).contains(&factor));

        let [r, g, b, a] = self.0;
        let [r2, g2, b2, a2] = other.0;

        RgbaColor([
            f64::round((1. - factor) * f64::from(r) + factor * f64::from(r2)).clamp(0., 255.) as u8,
            f64::round((1. - factor) * f64::from(g) + factor * f64::from(g2)).clamp(0., 255.) as u8,
            f64::round((1. - factor) * f64::from(b) + factor * f64::from(b2)).clamp(0., 255.) as u8,
            f64::round((1. - factor) * f64::from(a) + factor * f64::from(a2)).clamp(0., 255.) as u8,
        ])
    }
}

impl From<RgbaColor> for image::Rgba<u8> {
    /// Transform an `RgbaColor` to its counterpart from the image crate
    fn from(color: RgbaColor) -> Self {
        // [r, g, b, a]
        image::Rgba(color.0)
    }
}
