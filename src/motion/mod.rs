pub(crate) mod opacity;
pub(crate) mod scroll;
