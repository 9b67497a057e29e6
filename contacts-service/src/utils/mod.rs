pub mod gravatar;
pub mod password;
pub mod token;
pub mod validation;
