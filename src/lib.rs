//! Prompt-to-emoji studio for the terminal.
//!
//! Signed-in users describe an emoji, the prompt goes to a hosted
//! image-generation endpoint, and the result is stored next to everyone
//! else's public creations. The identity provider, the inference endpoint
//! and the document store all sit behind traits so the services can be
//! driven by mocks in tests.

pub mod app;
pub mod auth;
pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod emoji;
pub mod events;
pub mod generator;
pub mod logging;
pub mod profile;
pub mod spinner;
pub mod store;
