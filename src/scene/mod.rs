pub(crate) mod edit;
pub(crate) mod effect;
pub(crate) mod model;
