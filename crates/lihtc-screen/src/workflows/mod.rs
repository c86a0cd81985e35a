pub mod parcels;
pub mod reference;
pub mod report;
pub mod screening;
