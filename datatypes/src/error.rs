use snafu::Snafu;

use crate::metrics::MetricsError;
use crate::primitives::PrimitivesError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))] // disables default `Snafu` suffix
pub enum Error {
    #[snafu(display("Plot exception: {}", details))]
    Plot {
        details: String,
    },

    #[snafu(display("Colorizer exception: {}", details))]
    Colorizer {
        details: String,
    },

    Metrics {
        source: MetricsError,
    },

    Primitives {
        source: PrimitivesError,
    },
}

impl From<ordered_float::FloatIsNan> for Error {
    fn from(_: ordered_float::FloatIsNan) -> Self {
        Error::Colorizer {
            details: "Breakpoint values must not be NaN".to_string(),
        }
    }
}
