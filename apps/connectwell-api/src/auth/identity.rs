//! Identity provider seam. Login credentials are checked by an external
//! provider; this service only turns a verified identity into a session.

use async_trait::async_trait;

use crate::error::{ApiError, FieldError};

/// A user identity vouched for by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: String,
    pub display_name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, email: &str, display_name: &str) -> Result<VerifiedIdentity, ApiError>;
}

/// Demo provider: accepts any well-formed email and derives a stable user id
/// from it. Not for production use.
pub struct DemoIdentityProvider;

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn verify(&self, email: &str, display_name: &str) -> Result<VerifiedIdentity, ApiError> {
        let email = email.trim().to_lowercase();
        let display_name = display_name.trim();

        let mut errors = Vec::new();
        if !email.contains('@') || email.len() < 3 {
            errors.push(FieldError {
                field: "email".into(),
                message: "Invalid email address".into(),
            });
        }
        if display_name.is_empty() {
            errors.push(FieldError {
                field: "displayName".into(),
                message: "Display name is required".into(),
            });
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let slug: String = email
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        Ok(VerifiedIdentity {
            user_id: format!("{}_{}", connectwell_common::id::prefix::USER, slug),
            display_name: display_name.to_string(),
        })
    }
}
