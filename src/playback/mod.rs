pub(crate) mod cancel;
pub(crate) mod pacer;
pub(crate) mod scheduler;
