pub mod credentials;
pub mod tokens;
