//! Library crate for trivia-buzzer-back, exposing modules for binaries and tests.

/// Runtime configuration and game timings.
pub mod config;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Pure game rules: race, votes, boons, gauntlet and derived views.
pub mod game;
/// HTTP route trees.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// Shared application state and the session state machine.
pub mod state;
/// Shared State Store contract and its in-memory implementation.
pub mod store;
