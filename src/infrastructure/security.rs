use crate::domain::user::{Role, User};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

/// Signed token payload. The signature guarantees integrity, not
/// confidentiality: anyone holding the token can read these.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    role: Role,
    name: Option<String>,
    iat: i64,
    exp: i64,
}

/// Identity context decoded from a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
    pub name: Option<String>,
}

/// Outcomes of the auth gate. Both are terminal for the request; recovery is
/// a fresh login.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Insufficient permissions")]
    Forbidden,
}

fn argon2() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
            .map_err(argon2::password_hash::Error::from)?,
    ))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Compares a plaintext credential against a stored hash. The comparison is
/// delegated to the Argon2 verifier; a mismatch and a match take the same
/// code path.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match argon2()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

pub fn issue_token(
    user: &User,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub: user.id.clone(),
        role: user.role,
        name: user.name.clone(),
        iat: now,
        exp: now + ttl_secs as i64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 60; // 60 seconds leeway

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    let claims = token_data.claims;
    Ok(AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role,
        name: claims.name,
    })
}

/// Turns a presented token into an authorization decision in one synchronous
/// step: missing or unverifiable token means `Unauthenticated`; a verified
/// token whose role is outside a non-empty allow-list means `Forbidden`. An
/// empty allow-list accepts any validly signed token.
pub fn authorize(
    token: Option<&str>,
    allowed_roles: &[Role],
    secret: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated)?;
    let user = decode_token(token, secret).map_err(|_| AuthError::Unauthenticated)?;

    if !allowed_roles.is_empty() && !allowed_roles.contains(&user.role) {
        return Err(AuthError::Forbidden);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: "user-123".to_string(),
            name: Some("Ana".to_string()),
            email: "ana@x.com".to_string(),
            password_hash: String::new(),
            role,
        }
    }

    #[test]
    fn test_hash_password_generates_valid_hash() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        assert!(!hash.is_empty());
        assert_ne!(hash, password);
        // Argon2id PHC string format
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_password_same_password_produces_different_hashes() {
        let password = "same_password";

        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Random salt per hash
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_password_returns_true() {
        let password = "correct_password";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect_password_returns_false() {
        let hash = hash_password("correct_password").unwrap();

        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash_format() {
        let result = verify_password("test_password", "not_a_valid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_password_with_unicode() {
        let password = "пароль123";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_issue_token_creates_three_part_jwt() {
        let token = issue_token(&sample_user(Role::Student), "test_secret", 3600).unwrap();

        assert!(!token.is_empty());
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_token_round_trips_claims() {
        let user = sample_user(Role::Teacher);
        let token = issue_token(&user, "test_secret", 3600).unwrap();

        let decoded = decode_token(&token, "test_secret").unwrap();
        assert_eq!(decoded.user_id, "user-123");
        assert_eq!(decoded.role, Role::Teacher);
        assert_eq!(decoded.name, Some("Ana".to_string()));
    }

    #[test]
    fn test_token_round_trips_without_name() {
        let mut user = sample_user(Role::Parent);
        user.name = None;
        let token = issue_token(&user, "test_secret", 3600).unwrap();

        let decoded = decode_token(&token, "test_secret").unwrap();
        assert_eq!(decoded.name, None);
    }

    #[test]
    fn test_decode_token_rejects_garbage() {
        assert!(decode_token("invalid.token.here", "secret_key").is_err());
        assert!(decode_token("", "secret_key").is_err());
    }

    #[test]
    fn test_decode_token_rejects_wrong_secret() {
        let token = issue_token(&sample_user(Role::Admin), "correct_secret", 3600).unwrap();
        assert!(decode_token(&token, "wrong_secret").is_err());
    }

    #[test]
    fn test_decode_token_rejects_tampered_payload() {
        let student = issue_token(&sample_user(Role::Student), "secret", 3600).unwrap();
        let admin = issue_token(&sample_user(Role::Admin), "secret", 3600).unwrap();

        // Splice the admin payload onto the student signature
        let student_parts: Vec<&str> = student.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            student_parts[0], admin_parts[1], student_parts[2]
        );

        assert!(decode_token(&forged, "secret").is_err());
    }

    #[test]
    fn test_decode_token_rejects_expired() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-123".to_string(),
            role: Role::Student,
            name: None,
            iat: now - 7200,
            // Beyond the 60s leeway
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("secret".as_ref()),
        )
        .unwrap();

        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn test_authorize_without_token_is_unauthenticated() {
        let result = authorize(None, &[], "secret");
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);
    }

    #[test]
    fn test_authorize_with_garbage_token_is_unauthenticated() {
        let result = authorize(Some("not-a-jwt"), &[], "secret");
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);

        // An invalid token never reaches the role check, whatever it claims
        let result = authorize(Some("not-a-jwt"), &[Role::Admin], "secret");
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);
    }

    #[test]
    fn test_authorize_empty_allow_list_accepts_any_role() {
        for role in [Role::Admin, Role::Teacher, Role::Student, Role::Parent] {
            let token = issue_token(&sample_user(role), "secret", 3600).unwrap();
            let user = authorize(Some(&token), &[], "secret").unwrap();
            assert_eq!(user.role, role);
        }
    }

    #[test]
    fn test_authorize_role_outside_allow_list_is_forbidden() {
        let token = issue_token(&sample_user(Role::Student), "secret", 3600).unwrap();

        let result = authorize(Some(&token), &[Role::Admin], "secret");
        assert_eq!(result.unwrap_err(), AuthError::Forbidden);
    }

    #[test]
    fn test_authorize_role_inside_allow_list_is_accepted() {
        let token = issue_token(&sample_user(Role::Student), "secret", 3600).unwrap();

        let user = authorize(Some(&token), &[Role::Student], "secret").unwrap();
        assert_eq!(user.user_id, "user-123");

        let user = authorize(Some(&token), &[Role::Admin, Role::Student], "secret").unwrap();
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn test_authorize_wrong_secret_is_unauthenticated_not_forbidden() {
        let token = issue_token(&sample_user(Role::Admin), "other_secret", 3600).unwrap();

        let result = authorize(Some(&token), &[Role::Admin], "secret");
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);
    }
}
