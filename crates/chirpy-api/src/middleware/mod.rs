//! Request middleware
//!
//! Author: hephaex@gmail.com

pub mod metrics;

pub use metrics::count_fileserver_hits;
