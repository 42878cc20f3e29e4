//! OAuth1 (RFC 5849) consumer with RSA-SHA1 signing, as used by Bitbucket
//! Server application links, plus consumer key material generation.

pub mod consumer;
pub mod keys;
pub mod signature;

pub use consumer::{AccessToken, OAuth1Consumer, RequestToken, ServiceProvider};
pub use keys::{generate_consumer_key, generate_key_material, parse_private_key, ConsumerKeyMaterial};
