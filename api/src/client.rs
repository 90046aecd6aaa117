use crate::Resource;
use crate::wire::{ErrorBody, WithId};
use reqwest::{Client, RequestBuilder, Response};
use std::fmt;
use std::time::Duration;

pub use reqwest::StatusCode;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v2";

/// REST client for the tournament API.
///
/// Every resource follows the same shape:
/// `GET /<path>`, `GET /<path>/{id}`, `POST /<path>`, `PUT /<path>/{id}`,
/// `DELETE /<path>/{id}`.
#[derive(Debug, Clone)]
pub struct TourneyApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for TourneyApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status {
        status: StatusCode,
        message: Option<String>,
        url: String,
    },
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl ApiError {
    /// Human-readable message the server attached to a rejected request.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status { status, message: Some(msg), url } => {
                write!(f, "API error {status} for {url}: {msg}")
            }
            ApiError::Status { status, message: None, url } => {
                write!(f, "API error {status} for {url}")
            }
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(url) => write!(f, "Not found: {url}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl TourneyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("tourney-admin/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url<T: Resource>(&self) -> String {
        format!("{}/{}", self.base_url, T::PATH)
    }

    pub fn item_url<T: Resource>(&self, id: u64) -> String {
        format!("{}/{}/{id}", self.base_url, T::PATH)
    }

    /// Fetch the whole collection, in server order.
    pub async fn list<T: Resource>(&self) -> ApiResult<Vec<T>> {
        let url = self.collection_url::<T>();
        let response = self.send(self.client.get(&url), &url).await?;
        decode(response, &url).await
    }

    /// Fetch one record. A 404 maps to [`ApiError::NotFound`].
    pub async fn get<T: Resource>(&self, id: u64) -> ApiResult<T> {
        let url = self.item_url::<T>(id);
        let response = self.send(self.client.get(&url), &url).await?;
        decode(response, &url).await
    }

    /// Create a record; the server assigns the id and returns the full record.
    pub async fn create<T: Resource>(&self, draft: &T::Draft) -> ApiResult<T> {
        let url = self.collection_url::<T>();
        let response = self.send(self.client.post(&url).json(draft), &url).await?;
        decode(response, &url).await
    }

    /// Replace a record with the given field values.
    pub async fn update<T: Resource>(&self, id: u64, draft: &T::Draft) -> ApiResult<T> {
        let url = self.item_url::<T>(id);
        let body = WithId { id, draft };
        let response = self.send(self.client.put(&url).json(&body), &url).await?;
        decode(response, &url).await
    }

    /// Delete a record. Any response body is ignored.
    pub async fn delete<T: Resource>(&self, id: u64) -> ApiResult<()> {
        let url = self.item_url::<T>(id);
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_owned()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            message: ErrorBody::message_from(&body),
            url: url.to_owned(),
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parsing(e, url.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IdRef, Team, TeamDraft, TournamentTeam, TournamentTeamDraft};
    use mockito::Matcher;

    const JSON: (&str, &str) = ("content-type", "application/json");

    #[test]
    fn urls_are_built_from_resource_paths() {
        let api = TourneyApi::with_base_url("http://host:9000/api/v2/");
        assert_eq!(api.base_url(), "http://host:9000/api/v2");
        assert_eq!(api.collection_url::<Team>(), "http://host:9000/api/v2/teams");
        assert_eq!(
            api.item_url::<TournamentTeam>(12),
            "http://host:9000/api/v2/tournament-teams/12"
        );
    }

    #[test]
    fn default_points_at_local_api() {
        assert_eq!(TourneyApi::new().collection_url::<Team>(), "http://localhost:8080/api/v2/teams");
    }

    #[tokio::test]
    async fn list_returns_records_in_server_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/teams")
            .with_status(200)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"[{"id": 2, "name": "Tigers"}, {"id": 1, "name": "Lions"}]"#)
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let teams = api.list::<Team>().await.unwrap();

        mock.assert_async().await;
        let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Tigers", "Lions"]);
    }

    #[tokio::test]
    async fn get_maps_404_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/teams/99").with_status(404).create_async().await;

        let api = TourneyApi::with_base_url(server.url());
        let err = api.get::<Team>(99).await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn create_posts_draft_and_returns_server_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tournament-teams")
            .match_body(Matcher::JsonString(
                r#"{"tournament": {"id": 1}, "team": {"id": 10}}"#.to_string(),
            ))
            .with_status(201)
            .with_header(JSON.0, JSON.1)
            .with_body(
                r#"{"id": 5, "tournament": {"id": 1, "name": "Cup", "year": 2024}, "team": {"id": 10, "name": "Lions"}}"#,
            )
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let draft = TournamentTeamDraft { tournament: IdRef::new(1), team: IdRef::new(10) };
        let created = api.create::<TournamentTeam>(&draft).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, 5);
        assert_eq!(created.team.name, "Lions");
    }

    #[tokio::test]
    async fn rejected_create_carries_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/teams")
            .with_status(400)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"{"message": "Name must be unique"}"#)
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let err = api
            .create::<Team>(&TeamDraft { name: "Lions".into() })
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Name must be unique"));
        assert!(matches!(err, ApiError::Status { status, .. } if status == StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn update_puts_full_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/teams/3")
            .match_body(Matcher::JsonString(r#"{"id": 3, "name": "Bears"}"#.to_string()))
            .with_status(200)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"{"id": 3, "name": "Bears"}"#)
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let updated = api
            .update::<Team>(3, &TeamDraft { name: "Bears".into() })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(updated, Team { id: 3, name: "Bears".into() });
    }

    #[tokio::test]
    async fn delete_ignores_body_and_reports_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server.mock("DELETE", "/teams/1").with_status(204).create_async().await;
        server.mock("DELETE", "/teams/2").with_status(500).create_async().await;

        let api = TourneyApi::with_base_url(server.url());
        assert!(api.delete::<Team>(1).await.is_ok());
        let err = api.delete::<Team>(2).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status, message: None, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parsing_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams")
            .with_status(200)
            .with_header(JSON.0, JSON.1)
            .with_body("not json")
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let err = api.list::<Team>().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)));
    }
}
