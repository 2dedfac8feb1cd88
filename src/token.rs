//! Access tokens for joining a voice room.
//!
//! Tokens are HS256 JWTs carrying a `video` grant, the shape the realtime
//! voice platform expects.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::info;

use crate::config::TokenConfig;
use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_IDENTITY: &str = "grocery-shopper";
pub const DEFAULT_ROOM: &str = "grocery-assistant";
const TOKEN_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub identity: String,
    pub room: String,
    pub can_publish_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoGrant<'a> {
    room_join: bool,
    room: &'a str,
    can_publish: bool,
    can_subscribe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_publish_data: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    name: &'a str,
    nbf: u64,
    exp: u64,
    video: VideoGrant<'a>,
}

pub struct TokenIssuer {
    api_key: String,
    api_secret: String,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    pub fn issue(&self, request: &TokenRequest) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::Clock)?
            .as_secs();

        let claims = Claims {
            iss: &self.api_key,
            sub: &request.identity,
            name: &request.identity,
            nbf: now,
            exp: now + TOKEN_TTL.as_secs(),
            video: VideoGrant {
                room_join: true,
                room: &request.room,
                can_publish: true,
                can_subscribe: true,
                can_publish_data: request.can_publish_data.then_some(true),
            },
        };

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header, payload);

        let mut mac =
            HmacSha256::new_from_slice(self.api_secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        info!(identity = %request.identity, room = %request.room, "issued room token");
        Ok(format!("{}.{}", signing_input, signature))
    }
}

/// A fresh `grocery-room-xxxxxxxx` name.
pub fn generate_room_name() -> String {
    format!("grocery-room-{:08x}", rand::random::<u32>())
}
