//! Identity Adapter

mod token_identity;

pub use token_identity::HmacTokenIdentity;
