use continuum_datatypes::plots::PlotData;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One concrete rendering of a metric value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricRepresentation {
    Scalar(f64),
    Matrix(Array2<f64>),
    Image(Vec<u8>),
    Plot(PlotData),
}

impl MetricRepresentation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Self::Scalar(_) => RepresentationKind::Scalar,
            Self::Matrix(_) => RepresentationKind::Matrix,
            Self::Image(_) => RepresentationKind::Image,
            Self::Plot(_) => RepresentationKind::Plot,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepresentationKind {
    Scalar,
    Matrix,
    Image,
    Plot,
}

/// Alternative representations of one logged value, ordered by the
/// producer's preference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeValues {
    alternatives: Vec<MetricRepresentation>,
}

impl AlternativeValues {
    pub fn new(alternatives: Vec<MetricRepresentation>) -> Self {
        Self { alternatives }
    }

    /// The first representation a consumer supports, or `None` if it
    /// supports none of them.
    pub fn best_supported(&self, supported: &[RepresentationKind]) -> Option<&MetricRepresentation> {
        self.alternatives
            .iter()
            .find(|representation| supported.contains(&representation.kind()))
    }

    pub fn alternatives(&self) -> &[MetricRepresentation] {
        &self.alternatives
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricPayload {
    Single(MetricRepresentation),
    Alternatives(AlternativeValues),
}

/// A named, step-tagged value handed to the logging subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub name: String,
    pub payload: MetricPayload,
    pub step: u64,
}
