use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes an HS256 access token. Refresh tokens are not accepted here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Not an access token".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const SECRET: &str = "test-secret";

    pub fn token(user_id: u64, role: u8, token_type: TokenType) -> String {
        let claims = Claims {
            user_id,
            sub: format!("user{user_id}"),
            role,
            exp: chrono::Utc::now().timestamp() as usize + 600,
            jti: format!("jti-{user_id}"),
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn access_token(user_id: u64, role: u8) -> String {
        token(user_id, role, TokenType::Access)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn accepts_access_tokens() {
        let claims = verify_token(&access_token(7, 3), SECRET).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, 3);
    }

    #[test]
    fn rejects_refresh_tokens_and_foreign_secrets() {
        assert!(verify_token(&token(7, 3, TokenType::Refresh), SECRET).is_err());
        assert!(verify_token(&access_token(7, 3), "other-secret").is_err());
    }
}
