//! Denormalises learner progress into `StudentStats` rows for admin reporting.
pub mod config;
pub mod db;
