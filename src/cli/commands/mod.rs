pub mod authorize;
pub mod keys;
pub mod request_login;
pub mod version;
