#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod command;
mod config;
mod encoder;
mod post_processor;
mod support;
