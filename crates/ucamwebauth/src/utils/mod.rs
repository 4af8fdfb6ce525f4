pub(crate) mod bounds;
pub(crate) mod der;
pub(crate) mod wls_base64;
