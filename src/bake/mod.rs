pub(crate) mod progress;
pub(crate) mod session;
pub(crate) mod store;
