use serde::{Deserialize, Serialize};

use crate::post::Post;

/// Payload for every operation that answers with a collection.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted(id: u32) -> Self {
        Self {
            message: format!("Post with id {id} has been deleted successfully"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn id_not_found() -> Self {
        Self {
            error: "id not found".into(),
        }
    }

    pub fn decode_failure() -> Self {
        Self {
            error: "Failed to decode JSON object".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StoreMetadata {
    pub posts_count: usize,
    pub latest_post_id: Option<u32>,
}
