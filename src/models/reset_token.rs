use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// One password-reset attempt. Several unconsumed tokens may exist for
/// the same user at once; expired ones stay in storage until they are
/// consumed-and-rejected or deleted explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 6-digit zero-padded verification code.
    pub token: String,
    pub user_id: i32,
    pub expiry_date: DateTime,
}
