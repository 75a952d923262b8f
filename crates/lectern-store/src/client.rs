use async_trait::async_trait;
use lectern_core::config::StoreConfig;
use lectern_core::{Lecture, LectureFields, LectureId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// CRUD operations against the remote lecture collection.
#[async_trait]
pub trait LectureStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Lecture>>;

    /// Create a lecture; the store assigns the identifier.
    async fn create(&self, fields: &LectureFields) -> Result<Lecture>;

    /// Full-record update.
    async fn update(&self, id: LectureId, fields: &LectureFields) -> Result<Lecture>;

    async fn delete(&self, id: LectureId) -> Result<()>;
}

/// The "starting soon" feed polled by the reminder engine.
///
/// The service alone decides which lectures qualify; callers send no window.
#[async_trait]
pub trait UpcomingSource: Send + Sync {
    async fn fetch_upcoming(&self) -> Result<Vec<Lecture>>;
}

/// Body of `GET <upcoming>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingResponse {
    pub reminders: Vec<Lecture>,
}

/// reqwest-backed client for the lecture service.
pub struct HttpLectureStore {
    client: reqwest::Client,
    lectures_url: String,
    upcoming_url: String,
}

impl HttpLectureStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            &config.lectures_url,
            &config.upcoming_url,
        ))
    }

    pub fn with_client(client: reqwest::Client, lectures_url: &str, upcoming_url: &str) -> Self {
        Self {
            client,
            lectures_url: with_trailing_slash(lectures_url),
            upcoming_url: upcoming_url.to_string(),
        }
    }

    fn create_url(&self) -> String {
        format!("{}create/", self.lectures_url)
    }

    fn update_url(&self, id: LectureId) -> String {
        format!("{}update/{}/", self.lectures_url, id)
    }

    fn delete_url(&self, id: LectureId) -> String {
        format!("{}delete/{}/", self.lectures_url, id)
    }
}

#[async_trait]
impl LectureStore for HttpLectureStore {
    async fn list(&self) -> Result<Vec<Lecture>> {
        debug!(url = %self.lectures_url, "listing lectures");
        let resp = self
            .client
            .get(&self.lectures_url)
            .send()
            .await
            .map_err(StoreError::from_send)?;
        parse_json(ensure_success(resp, "list").await?).await
    }

    async fn create(&self, fields: &LectureFields) -> Result<Lecture> {
        let url = self.create_url();
        debug!(%url, lesson = %fields.lesson_name, "creating lecture");
        let resp = self
            .client
            .post(&url)
            .json(fields)
            .send()
            .await
            .map_err(StoreError::from_send)?;
        parse_json(ensure_success(resp, "create").await?).await
    }

    async fn update(&self, id: LectureId, fields: &LectureFields) -> Result<Lecture> {
        let url = self.update_url(id);
        debug!(%url, lecture_id = %id, "updating lecture");
        let resp = self
            .client
            .put(&url)
            .json(fields)
            .send()
            .await
            .map_err(StoreError::from_send)?;
        parse_json(ensure_success(resp, "update").await?).await
    }

    async fn delete(&self, id: LectureId) -> Result<()> {
        let url = self.delete_url(id);
        debug!(%url, lecture_id = %id, "deleting lecture");
        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(StoreError::from_send)?;
        ensure_success(resp, "delete").await?;
        Ok(())
    }
}

#[async_trait]
impl UpcomingSource for HttpLectureStore {
    async fn fetch_upcoming(&self) -> Result<Vec<Lecture>> {
        let resp = self
            .client
            .get(&self.upcoming_url)
            .send()
            .await
            .map_err(StoreError::from_send)?;
        let body: UpcomingResponse = parse_json(ensure_success(resp, "upcoming").await?).await?;
        debug!(count = body.reminders.len(), "fetched upcoming lectures");
        Ok(body.reminders)
    }
}

async fn ensure_success(resp: reqwest::Response, op: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    warn!(op, status = status.as_u16(), body = %text, "lecture service error");
    Err(StoreError::Api {
        status: status.as_u16(),
        message: text,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    resp.json()
        .await
        .map_err(|e| StoreError::Parse(e.to_string()))
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
