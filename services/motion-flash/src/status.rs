//! Room status source: fetches per-room motion flags from the dashboard API

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PollError;
use crate::io::HttpClient;

/// Identifier of a room as reported by the API. Numeric ids are normalised to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        RoomId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(RoomId(id))
    }
}

/// One room's entry in a status poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatus {
    #[serde(default)]
    pub id: RoomId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "truthy_flag")]
    pub motion_detected: bool,
}

impl RoomStatus {
    pub fn new(id: impl Into<String>, name: impl Into<String>, motion_detected: bool) -> Self {
        Self {
            id: RoomId(id.into()),
            name: name.into(),
            motion_detected,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON value, read as a flag by its truthiness
fn truthy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_truthy(&serde_json::Value::deserialize(deserializer)?))
}

/// Top-level body of `GET /api/rooms`
#[derive(Debug, Deserialize)]
struct RoomsResponse {
    #[serde(default)]
    success: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    rooms: Vec<RoomStatus>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}

/// Outcome of a single fetch
pub type PollResult = std::result::Result<Vec<RoomStatus>, PollError>;

/// Source of the current per-room motion state
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Human-readable location of the source, used in diagnostics
    fn endpoint(&self) -> &str;

    /// Fetch the current room list. Never retries.
    async fn fetch(&self) -> PollResult;
}

/// Status source backed by an HTTP endpoint
pub struct HttpStatusSource {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for HttpStatusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpStatusSource")
            .field("url", &self.url)
            .finish()
    }
}

impl HttpStatusSource {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let url = url.into();
        tracing::debug!("Created HttpStatusSource for {}", url);
        Self { url, http }
    }
}

/// Turn a raw response into a poll result
pub fn parse_rooms_response(status: u16, body: &str) -> PollResult {
    if !(200..300).contains(&status) {
        return Err(PollError::Unknown(format!(
            "status endpoint returned HTTP {}",
            status
        )));
    }

    let parsed: RoomsResponse = serde_json::from_str(body)
        .map_err(|e| PollError::Unknown(format!("invalid status payload: {}", e)))?;

    if !is_truthy(&parsed.success) {
        let message = parsed.error.map(|e| match e {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        return Err(PollError::ApiLogical(message));
    }

    Ok(parsed.rooms)
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> PollResult {
        let response = self.http.get(&self.url).await?;
        let rooms = parse_rooms_response(response.status, &response.body)?;
        tracing::debug!("Fetched {} rooms from {}", rooms.len(), self.url);
        Ok(rooms)
    }
}
