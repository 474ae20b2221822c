//! Encoder discovery.
//!
//! Hardware encoders are tried in priority order with a tiny synthetic
//! encode; the first that succeeds is cached for the lifetime of the probe.

mod encoder_info;
mod probe;

pub use {
    encoder_info::{EncoderBackend, EncoderInfo, EncoderKind},
    probe::EncoderProbe,
};
