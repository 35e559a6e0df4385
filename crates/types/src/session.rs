//! Session credential types and the token-endpoint wire format.

use serde::{Deserialize, Serialize};

/// Response body of the token endpoint (`POST /api/auth/refresh`) and of the
/// OAuth callback / identity-token exchange endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user_id: u64,
}

/// The credential triplet held by the store once a session is established.
///
/// Access and refresh tokens are either both present or both absent; a
/// partial triplet is treated as no session at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_wire_names() {
        let json = r#"{
            "accessToken": "at123",
            "refreshToken": "rt456",
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "userId": 42
        }"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "at123");
        assert_eq!(resp.refresh_token, "rt456");
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 3600);
        assert_eq!(resp.user_id, 42);
    }

    #[test]
    fn test_token_response_serializes_camel_case() {
        let resp = TokenResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "Bearer".into(),
            expires_in: 900,
            user_id: 7,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(!json.contains("access_token"));
    }
}
