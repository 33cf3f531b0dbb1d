//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod polka;
pub mod users;
