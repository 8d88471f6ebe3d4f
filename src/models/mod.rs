pub mod address;
pub mod division;
pub mod reset_token;
pub mod user;
