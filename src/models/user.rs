use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
}

/// JWT claims attached to authenticated requests. `sub` is the user id;
/// handlers receive it through request extensions and pass it on
/// explicitly.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub exp: usize,
}
