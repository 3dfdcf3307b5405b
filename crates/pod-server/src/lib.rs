//! Pod server - username registration with server counter-signatures.
//!
//! A client submits a desired username plus three client-generated secrets
//! (a salt and two public keys). The server either rejects the submission or
//! durably reserves the username and returns an RSA signature binding the
//! username to those keys and to the serving domain. Clients present this
//! signature later as proof that the server vouches for the binding.

pub mod api;
pub mod config;
pub mod error;
pub mod registration;
pub mod trust;

pub use config::Config;
pub use error::RegistrationError;
pub use registration::RegistrationRequest;
pub use trust::{PrivateKey, TrustError, TrustRoot};
