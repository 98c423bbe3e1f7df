pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod observer;
pub(crate) mod status;
