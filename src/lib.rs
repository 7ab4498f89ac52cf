//! Tactical C3 - communication network topology for turn-based wargames

pub mod core;
pub mod network;
pub mod scenario;
