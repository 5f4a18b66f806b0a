//! Scheduled keep-alive ping.
//!
//! A cron job calls the endpoint with `Authorization: Bearer <CRON_SECRET>`
//! so the database stays warm. The header is compared by SHA-256 digest;
//! an unset secret rejects every call.

use sha2::{Digest, Sha256};

use crate::{db::DbPool, error::AppError};

/// Whether `authorization` is exactly `Bearer <secret>`.
pub fn is_authorized(authorization: Option<&str>, secret: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        tracing::warn!("CRON_SECRET is not configured, rejecting keep-alive");
        return false;
    };
    let Some(header) = authorization else {
        return false;
    };

    let expected = Sha256::digest(format!("Bearer {secret}").as_bytes());
    let provided = Sha256::digest(header.as_bytes());

    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Touch the database and return the number of widget configurations.
pub async fn ping(pool: &DbPool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM widget_configs")
        .fetch_one(pool)
        .await?;

    tracing::info!("Keep-alive ping succeeded, {} widget configs", count);

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_bearer_secret_is_accepted() {
        assert!(is_authorized(Some("Bearer s3cret"), Some("s3cret")));
    }

    #[test]
    fn anything_else_is_rejected() {
        let secret = Some("s3cret");
        for header in [None, Some(""), Some("s3cret"), Some("Bearer s3cret "), Some("bearer s3cret"), Some("Bearer other")] {
            assert!(!is_authorized(header, secret), "{header:?} should be rejected");
        }
    }

    #[test]
    fn unset_secret_rejects_everything() {
        assert!(!is_authorized(Some("Bearer "), None));
        assert!(!is_authorized(Some("Bearer "), Some("")));
    }
}
