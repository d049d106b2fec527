use jsonwebtoken::{decode, Validation, DecodingKey, Algorithm};
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::error::AppError;

/// Claims of a merchant token. `sub` is the id of the stall the merchant owns.
/// Tokens are issued by the external identity provider; this service only
/// verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

fn default_role() -> String {
    "merchant".to_string()
}

impl Claims {
    pub fn stall_id(&self) -> Result<Uuid, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Token subject is not a stall id"))
    }
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens come from the identity provider, which sets its own audience.
    validation.validate_aud = false;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|d| d.claims)
        .map_err(|e| AppError::unauthorized(format!("Invalid or expired token: {e}")))
}
