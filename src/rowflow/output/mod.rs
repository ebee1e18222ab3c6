//! Result output writers.
//!
//! Only the local CSV artifact writer lives here; sheet and warehouse
//! targets are external collaborators that consume the validated
//! [`crate::rowflow::validation::SaveSpec`].

pub mod csv;

pub use csv::write_csv;
