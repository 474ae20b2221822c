use crate::{CameraShape, OverlayPlacement};

use std::fmt;

/// Stream type selected from an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Video stream (`v`).
    Video,
    /// Audio stream (`a`).
    Audio,
}

/// An edge endpoint in the filter graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadRef {
    /// A stream of a numbered input, e.g. `[1:v]`.
    Input {
        /// Input index in spawn order.
        index: usize,
        /// Stream selected from the input.
        kind: StreamKind,
    },
    /// A named intermediate or output pad, e.g. `[cam]`.
    Label(String),
}

impl PadRef {
    /// Video stream of input `index`.
    pub fn video(index: usize) -> Self {
        PadRef::Input {
            index,
            kind: StreamKind::Video,
        }
    }

    /// Audio stream of input `index`.
    pub fn audio(index: usize) -> Self {
        PadRef::Input {
            index,
            kind: StreamKind::Audio,
        }
    }

    /// Named pad.
    pub fn label(name: impl Into<String>) -> Self {
        PadRef::Label(name.into())
    }
}

impl fmt::Display for PadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadRef::Input {
                index,
                kind: StreamKind::Video,
            } => write!(f, "[{}:v]", index),
            PadRef::Input {
                index,
                kind: StreamKind::Audio,
            } => write!(f, "[{}:a]", index),
            PadRef::Label(name) => write!(f, "[{}]", name),
        }
    }
}

/// A single filter node.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Start video timestamps at zero.
    ResetPts,
    /// Start audio timestamps at zero, shifted by `offset_secs`.
    ResetAudioPts {
        /// Shift applied after the reset, in seconds.
        offset_secs: f64,
    },
    /// Scale to an exact size.
    Scale {
        /// Target width.
        width: u32,
        /// Target height.
        height: u32,
    },
    /// Scale to fit inside a box, keeping aspect ratio.
    FitScale {
        /// Box width.
        width: u32,
        /// Box height.
        height: u32,
    },
    /// Letterbox to a box with black bars, centered.
    Pad {
        /// Box width.
        width: u32,
        /// Box height.
        height: u32,
    },
    /// Centered square crop.
    CropSquare,
    /// Mirror horizontally.
    HFlip,
    /// Convert pixel format.
    Format(&'static str),
    /// Alpha-mask everything outside the inscribed circle.
    CircleMask,
    /// Composite the second input over the first.
    Overlay {
        /// Left edge of the overlay.
        x: i32,
        /// Top edge of the overlay.
        y: i32,
        /// End when the shortest input ends.
        shortest: bool,
        /// Keep passing the base through after the overlay ends.
        pass_on_eof: bool,
    },
    /// Resample audio, stretching or squeezing by at most `max_compensation`
    /// samples per second to follow timestamps.
    AsyncResample {
        /// Maximum compensation in samples per second.
        max_compensation: u32,
    },
    /// Pad the end of the audio with silence.
    PadSilence,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::ResetPts => f.write_str("setpts=PTS-STARTPTS"),
            Filter::ResetAudioPts { offset_secs } => {
                if *offset_secs == 0.0 {
                    f.write_str("asetpts=PTS-STARTPTS")
                } else if *offset_secs > 0.0 {
                    write!(f, "asetpts=PTS-STARTPTS+{:.3}/TB", offset_secs)
                } else {
                    write!(f, "asetpts=PTS-STARTPTS-{:.3}/TB", offset_secs.abs())
                }
            }
            Filter::Scale { width, height } => write!(f, "scale={}:{}", width, height),
            Filter::FitScale { width, height } => write!(
                f,
                "scale={}:{}:force_original_aspect_ratio=decrease",
                width, height
            ),
            Filter::Pad { width, height } => {
                write!(f, "pad={}:{}:(ow-iw)/2:(oh-ih)/2:black", width, height)
            }
            Filter::CropSquare => f.write_str("crop='min(iw,ih)':'min(iw,ih)'"),
            Filter::HFlip => f.write_str("hflip"),
            Filter::Format(pix_fmt) => write!(f, "format={}", pix_fmt),
            Filter::CircleMask => {
                f.write_str("geq=lum='p(X,Y)':a='if(lte(hypot(X-W/2,Y-H/2),W/2),255,0)'")
            }
            Filter::Overlay {
                x,
                y,
                shortest,
                pass_on_eof,
            } => {
                write!(f, "overlay={}:{}", x, y)?;
                if *shortest {
                    f.write_str(":shortest=1")?;
                }
                if *pass_on_eof {
                    f.write_str(":eof_action=pass")?;
                }
                Ok(())
            }
            Filter::AsyncResample { max_compensation } => {
                write!(f, "aresample=async={}:first_pts=0", max_compensation)
            }
            Filter::PadSilence => f.write_str("apad"),
        }
    }
}

/// Filters applied in sequence from `inputs` to `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    /// Input pads consumed by the first filter.
    pub inputs: Vec<PadRef>,
    /// Filters in application order.
    pub filters: Vec<Filter>,
    /// Label of the produced pad.
    pub output: String,
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{}", input)?;
        }
        let filters = self
            .filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}[{}]", filters, self.output)
    }
}

/// Ordered set of chains serialized as a `-filter_complex` argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain; returns the pad it produces.
    pub fn chain(
        &mut self,
        inputs: Vec<PadRef>,
        filters: Vec<Filter>,
        output: impl Into<String>,
    ) -> PadRef {
        let output = output.into();
        let pad = PadRef::Label(output.clone());
        self.chains.push(FilterChain {
            inputs,
            filters,
            output,
        });
        pad
    }

    /// Append filters to the end of the chain producing `label`.
    ///
    /// Returns `false` if no chain produces that label.
    pub fn append_to(&mut self, label: &str, filters: impl IntoIterator<Item = Filter>) -> bool {
        match self.chains.iter_mut().find(|c| c.output == label) {
            Some(chain) => {
                chain.filters.extend(filters);
                true
            }
            None => false,
        }
    }

    /// Rename the pad produced by the chain labelled `from`.
    ///
    /// Only valid while no other chain consumes `from`.
    pub(crate) fn rename_output(&mut self, from: &str, to: &str) -> bool {
        match self.chains.iter_mut().find(|c| c.output == from) {
            Some(chain) => {
                chain.output = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Chains in order.
    pub fn chains(&self) -> &[FilterChain] {
        &self.chains
    }

    /// Graph has no chains.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Whether any chain produces `label`.
    pub fn produces(&self, label: &str) -> bool {
        self.chains.iter().any(|c| c.output == label)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chains = self
            .chains
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";");
        f.write_str(&chains)
    }
}

/// Square crop, scale and optional circular mask for a camera overlay.
pub(crate) fn camera_filters(placement: OverlayPlacement, shape: CameraShape) -> Vec<Filter> {
    let mut filters = vec![
        Filter::ResetPts,
        Filter::CropSquare,
        Filter::Scale {
            width: placement.size,
            height: placement.size,
        },
    ];
    if shape == CameraShape::Circle {
        filters.push(Filter::Format("yuva420p"));
        filters.push(Filter::CircleMask);
    }
    filters
}
