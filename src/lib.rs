//! Gateway for the "future newspaper" front-end
//!
//! Forwards image and article requests to generative-AI providers, normalizes
//! their heterogeneous response shapes, and sanitizes generated articles into
//! a fixed schema before returning uniform JSON.

pub mod ai;
pub mod app;
pub mod article;
pub mod error;
pub mod handlers;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
