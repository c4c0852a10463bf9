pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod layers;
