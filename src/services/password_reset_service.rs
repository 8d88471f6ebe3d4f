// services/password_reset_service.rs
//
// Password-reset-by-email-code flow: generate a 6-digit code with a
// 10-minute expiry, mail it, and later consume it exactly once to
// authorize a password change. Expired tokens stay in storage until they
// are consumed-and-rejected or deleted explicitly; there is no sweep.

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Collection, Database};
use rand::Rng;
use tracing::info;

use crate::errors::{AppError, Result};
use crate::models::reset_token::PasswordResetToken;
use crate::models::user::User;
use crate::services::email_service::EmailService;

const USERS: &str = "users";
const TOKENS: &str = "password_reset_tokens";

/// Uniform random in [0, 999999], zero-padded. Not cryptographically
/// hardened.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// Strict comparison: a token checked exactly at its expiry instant is
/// still valid.
pub fn is_expired(expiry_date: BsonDateTime, now: DateTime<Utc>) -> bool {
    now.timestamp_millis() > expiry_date.timestamp_millis()
}

/// Decides whether a looked-up token may be consumed. A code with no
/// stored row (never issued, or already consumed) is invalid; an expired
/// one is rejected here, before any password work happens.
pub fn consumable_token(
    found: Option<PasswordResetToken>,
    now: DateTime<Utc>,
) -> Result<PasswordResetToken> {
    let token = found.ok_or(AppError::InvalidToken)?;
    if is_expired(token.expiry_date, now) {
        return Err(AppError::ExpiredToken);
    }
    Ok(token)
}

pub struct PasswordResetService {
    db: Database,
    email: EmailService,
}

impl PasswordResetService {
    pub fn new(db: Database, email: EmailService) -> Self {
        PasswordResetService { db, email }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn tokens(&self) -> Collection<PasswordResetToken> {
        self.db.collection(TOKENS)
    }

    /// Emails a fresh verification code to the given account. Outstanding
    /// codes for the same user are left untouched; several may be valid
    /// at once.
    pub async fn generate_reset_token(&self, email: &str) -> Result<()> {
        let user = self
            .users()
            .find_one(doc! { "email": email })
            .await?
            .ok_or_else(|| AppError::NotFound("Email không tồn tại".to_string()))?;

        let code = generate_verification_code();
        let expiry = Utc::now() + Duration::minutes(10);

        let token = PasswordResetToken {
            id: None,
            token: code.clone(),
            user_id: user.id,
            expiry_date: BsonDateTime::from_millis(expiry.timestamp_millis()),
        };
        self.tokens().insert_one(&token).await?;

        let body = format!(
            "Mã xác nhận để đặt lại mật khẩu của bạn là: {}. Mã này sẽ hết hạn sau 10 phút.",
            code
        );
        self.email
            .send_email(&user.email, "Mã xác nhận đặt lại mật khẩu", &body)
            .await?;

        info!("password reset code sent to user {}", user.id);
        Ok(())
    }

    /// Consumes a verification code: hashes and stores the new password,
    /// then deletes the token so it cannot be replayed.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<()> {
        let found = self.tokens().find_one(doc! { "token": code }).await?;
        let token = consumable_token(found, Utc::now())?;

        let password_hash = hash(new_password, DEFAULT_COST)?;
        self.users()
            .update_one(
                doc! { "_id": token.user_id },
                doc! { "$set": { "password_hash": password_hash } },
            )
            .await?;

        self.tokens().delete_one(doc! { "token": code }).await?;

        info!("password reset completed for user {}", token.user_id);
        Ok(())
    }

    /// Resolves the owner of an unconsumed code, if any.
    pub async fn find_by_token(&self, code: &str) -> Result<Option<User>> {
        let token = self.tokens().find_one(doc! { "token": code }).await?;

        match token {
            Some(token) => Ok(self
                .users()
                .find_one(doc! { "_id": token.user_id })
                .await?),
            None => Ok(None),
        }
    }

    /// Idempotent cleanup; deleting an unknown code is a no-op.
    pub async fn delete_by_token(&self, code: &str) -> Result<()> {
        self.tokens().delete_one(doc! { "token": code }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_is_six_ascii_digits() {
        for _ in 0..200 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = code.parse().unwrap();
            assert!(value <= 999_999);
        }
    }

    #[test]
    fn small_codes_are_zero_padded() {
        // 42 must render as "000042"
        assert_eq!(format!("{:06}", 42), "000042");
    }

    #[test]
    fn expiry_comparison_is_strict() {
        let now = Utc::now();
        let expiry = BsonDateTime::from_millis(now.timestamp_millis());
        assert!(!is_expired(expiry, now));
        assert!(!is_expired(expiry, now - Duration::seconds(1)));
        assert!(is_expired(expiry, now + Duration::seconds(1)));
    }

    #[test]
    fn ten_minute_window() {
        let created = Utc::now();
        let expiry = BsonDateTime::from_millis((created + Duration::minutes(10)).timestamp_millis());
        assert!(!is_expired(expiry, created + Duration::minutes(9)));
        assert!(is_expired(expiry, created + Duration::minutes(11)));
    }

    fn token_expiring_at(expiry: DateTime<Utc>) -> PasswordResetToken {
        PasswordResetToken {
            id: None,
            token: "123456".to_string(),
            user_id: 9,
            expiry_date: BsonDateTime::from_millis(expiry.timestamp_millis()),
        }
    }

    #[test]
    fn consumed_code_cannot_be_replayed() {
        let now = Utc::now();

        let first = consumable_token(Some(token_expiring_at(now + Duration::minutes(10))), now);
        assert!(first.is_ok());

        // Consumption deletes the row, so a second lookup with the same
        // code finds nothing and the reset is refused.
        let second = consumable_token(None, now);
        assert!(matches!(second, Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_code_is_refused_before_any_password_change() {
        let now = Utc::now();

        let result = consumable_token(Some(token_expiring_at(now - Duration::minutes(1))), now);
        assert!(matches!(result, Err(AppError::ExpiredToken)));
    }
}
