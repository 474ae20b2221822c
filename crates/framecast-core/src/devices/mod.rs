//! Capture device enumeration and label resolution.
//!
//! * `listing`: Parses the capture subsystem's device listing.
//! * `catalog`: Runs the listing once and caches the result.
//! * `matching`: Resolves caller labels against catalog names.

mod catalog;
mod listing;
mod matching;

pub use {
    catalog::DeviceCatalog,
    listing::{DeviceKind, DeviceList, parse_device_listing},
    matching::{DeviceMatch, MatchTier, match_device, normalize_device_name},
};

pub(crate) use listing::listing_args;
