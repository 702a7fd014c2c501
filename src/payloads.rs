//! Typed views over the two example payload schemas.
//!
//! The core treats every buffered item as an opaque [`Payload`]; these serde
//! structs are a convenience for consumers that know which endpoint a
//! channel points at.

use serde::{Deserialize, Serialize};

use crate::transports::Payload;

/// Payload shape of a joke endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joke {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub setup: String,
    pub punchline: String,
}

/// One user record inside a [`RandomUserPage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomUser {
    pub name: RandomUserName,
    pub phone: String,
    pub picture: RandomUserPicture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomUserName {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomUserPicture {
    pub medium: String,
}

/// Payload shape of a random-user endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomUserPage {
    pub results: Vec<RandomUser>,
}

impl Joke {
    /// Attempts to view an opaque payload as a joke.
    pub fn from_payload(payload: &Payload) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}

impl RandomUserPage {
    /// Attempts to view an opaque payload as a random-user page.
    pub fn from_payload(payload: &Payload) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}
