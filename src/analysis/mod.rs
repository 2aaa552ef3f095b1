/// Analysis layer: statistic helpers, the chart-selection dispatch, and the
/// precomputed insight summary.
///
/// Everything here is pure: a filtered [`crate::data::model::Dataset`] plus
/// its column-type partition go in, a typed payload for the renderer comes
/// out.  Preconditions fail as typed errors, never as a substituted chart.
pub mod insights;
pub mod select;
pub mod stats;
