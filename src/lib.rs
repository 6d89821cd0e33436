//! Library crate for quizpin-back, exposing modules for the binary and integration tests.

pub mod config;
mod dto;
mod error;
mod identity;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
