mod confusion_matrix_plot;

pub use confusion_matrix_plot::ConfusionMatrixPlot;

use crate::util::Result;
use serde::{Deserialize, Serialize};

pub trait Plot {
    /// Creates a Vega string for embedding it into a Html page
    ///
    /// # Errors
    ///
    /// This method fails on internal errors of the plot.
    ///
    fn to_vega_embeddable(&self, allow_interactions: bool) -> Result<PlotData>;
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotData {
    pub vega_string: String,
    pub metadata: PlotMetaData,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlotMetaData {
    None,
    Selection { selection_name: String },
}
