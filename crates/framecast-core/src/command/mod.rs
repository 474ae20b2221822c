//! Encoder invocation generation.
//!
//! * `filter_graph`: Typed filter-graph IR and its textual serialization.
//! * `encoding`: Per-backend encoder flags and container settings.
//! * `builder`: Assembles inputs, the filter graph and output flags.

mod builder;
mod encoding;
mod filter_graph;

pub use {
    builder::CommandBuilder,
    filter_graph::{Filter, FilterChain, FilterGraph, PadRef, StreamKind},
};

pub(crate) use {encoding::video_codec_args, filter_graph::camera_filters};
