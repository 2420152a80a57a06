use serde::Deserialize;
use serde_json::Value;

use crate::platform::InboxMessage;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub data: MessageData,
}

#[derive(Debug, Deserialize)]
pub struct MessageData {
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
}

impl From<MessageData> for InboxMessage {
    fn from(value: MessageData) -> Self {
        // Deleted accounts show up as "[deleted]" rather than null.
        let author = value.author.filter(|name| name != "[deleted]");
        Self {
            id: value.name,
            author,
            body: value.body,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub json: CommentJson,
}

#[derive(Debug, Deserialize)]
pub struct CommentJson {
    #[serde(default)]
    pub errors: Vec<Value>,
}
