//! Capture pipeline: output formats, capability probing, encoders, the surface stream and the
//! recorder that ties them together.

pub(crate) mod artifact;
pub(crate) mod capability;
pub(crate) mod encoder;
pub(crate) mod ffmpeg;
pub(crate) mod format;
pub(crate) mod recorder;
pub(crate) mod stream;
