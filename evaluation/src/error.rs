use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))] // disables default `Snafu` suffix
pub enum Error {
    #[snafu(context(false))]
    #[snafu(display("DataTypeError: {}", source))]
    DataType {
        source: continuum_datatypes::error::Error,
    },
}
