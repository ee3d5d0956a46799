//! Competency rating derivation: classify a final profile's summary,
//! translate score bands and behavior flags into rating deltas, and
//! persist the per-user rating list through [`repo::RatingRepository`].

pub mod classifier;
pub mod repo;
pub mod updater;
