use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::platform::types;

/// `POST /api/v1/access_token` response. Reddit reports bad user
/// credentials as `200 {"error": "invalid_grant"}`, so both shapes are
/// modelled here.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing<LinkData>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    pub created_utc: Option<f64>,
}

/// `POST /api/comment` response with `api_type=json`.
#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub json: CommentJson,
}

#[derive(Debug, Deserialize)]
pub struct CommentJson {
    /// Each error is `[code, message, field]`.
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
    pub data: Option<CommentData>,
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub things: Vec<Thing<CommentThing>>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThing {
    pub id: Option<String>,
    pub permalink: Option<String>,
}

/// Map listing children to posts, skipping anything that is not a link.
pub fn map_listing(listing: Listing, subreddit: &str) -> Vec<types::Post> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| map_post(thing.data, subreddit))
        .collect()
}

fn map_post(link: LinkData, subreddit: &str) -> types::Post {
    let fullname = link
        .name
        .unwrap_or_else(|| format!("t3_{}", link.id));
    let subreddit = if link.subreddit.is_empty() {
        subreddit.to_string()
    } else {
        link.subreddit
    };

    types::Post {
        id: link.id,
        fullname,
        title: link.title,
        permalink: link.permalink,
        subreddit,
        created_at: link
            .created_utc
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0)),
    }
}

/// Flatten Reddit's `[[code, message, field], ...]` errors into one line.
pub fn describe_errors(errors: &[Vec<serde_json::Value>]) -> String {
    errors
        .iter()
        .map(|error| {
            error
                .iter()
                .take(2)
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(": ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn map_comment(response: CommentResponse) -> types::CreatedComment {
    let thing = response
        .json
        .data
        .and_then(|data| data.things.into_iter().next());

    match thing {
        Some(thing) => types::CreatedComment {
            id: thing.data.id,
            permalink: thing.data.permalink,
        },
        None => types::CreatedComment {
            id: None,
            permalink: None,
        },
    }
}
