//! Recording session lifecycle.
//!
//! * `state`: Recorder states.
//! * `event`: Events published to subscribers.
//! * `layer_files`: Temporary files for background/foreground rasters.
//! * `segment_store`: Segment paths, finalisation and cleanup.
//! * `controller`: The state machine driving the encoder.

mod controller;
mod event;
mod layer_files;
mod segment_store;
mod state;

pub use {
    controller::SessionController,
    event::SessionEvent,
    layer_files::LayerFiles,
    segment_store::{SegmentStore, discard_file},
    state::RecorderState,
};

#[cfg(test)]
pub(crate) use segment_store::concat_list;
