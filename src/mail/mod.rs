pub mod decoders;
pub mod email_api;

pub use email_api::{EmailApi, HttpEmailApi};
