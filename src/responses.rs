//! Shared response types for the token endpoints.

use serde::Deserialize;

/// Body of `POST /token/`.
#[derive(Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /token/refresh/`.
#[derive(Deserialize)]
pub struct AccessToken {
    pub access: String,
}
