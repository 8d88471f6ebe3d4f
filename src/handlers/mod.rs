pub(crate) mod address;
pub(crate) mod password_reset;
