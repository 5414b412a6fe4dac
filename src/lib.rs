//! Authoritative server for a paper.io-style territory game.
//!
//! The engine lives in [`games::paperio`]; [`game::runner`] owns it on a single
//! task and feeds it commands from the UDP receive loop in `main`.

pub mod config;
pub mod game;
pub mod games;
pub mod network;
pub mod protocol;
pub mod session;
