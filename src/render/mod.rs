pub(crate) mod color;
pub(crate) mod compositor;
pub(crate) mod surface;
pub(crate) mod text;
