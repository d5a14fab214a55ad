pub mod email;
pub mod intent;
