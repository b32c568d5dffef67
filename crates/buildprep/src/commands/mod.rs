pub mod auth;
pub mod containerfile;
pub mod image_ref;
pub mod prefetch;
pub mod prefetch_config;
pub mod secrets;
