//! Geospatial screening of candidate parcels for Low-Income Housing Tax
//! Credit development: QCT/DDA basis boost, FEMA flood exposure, TDHCA
//! competition rules, then a weighted feasibility score.

pub mod config;
pub mod error;
pub mod spatial;
pub mod telemetry;
pub mod workflows;
