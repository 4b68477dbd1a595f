//! A two-player countdown chess clock for the browser.
//!
//! The clock logic lives in [`game::clock`] as pure transitions over
//! [`models::ClockState`]. [`controller::ClockController`] applies their effects
//! through the [`ports`] traits, which the `web` module implements on top of
//! web-sys when built for `wasm32`.

pub mod config;
pub mod controller;
pub mod error;
pub mod game;
pub mod models;
pub mod ports;

#[cfg(not(target_arch = "wasm32"))]
pub mod routes;

#[cfg(target_arch = "wasm32")]
pub mod web;
