pub mod label;
pub mod visit;

pub use label::PlaceLabel;
pub use visit::{Visit, VisitInfo};
