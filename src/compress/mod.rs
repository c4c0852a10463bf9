pub(crate) mod channel;
pub(crate) mod critical;
pub(crate) mod rdp;
