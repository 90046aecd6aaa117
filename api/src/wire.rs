/// Envelope types that only exist on the wire.
use serde::{Deserialize, Serialize};

/// Error body returned by the API on rejected requests.
#[derive(Deserialize, Default, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract a non-empty `message` from a raw response body, if there is one.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// PUT body: the draft fields plus the record id.
#[derive(Serialize, Debug)]
pub struct WithId<'a, D> {
    pub id: u64,
    #[serde(flatten)]
    pub draft: &'a D,
}
