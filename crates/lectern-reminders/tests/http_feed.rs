// Reminder engine driven by a real HTTP feed.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use lectern_core::{Lecture, LectureId, Toast, ToastSink};
use lectern_reminders::{ActiveFlag, PollOutcome, ReminderEngine};
use lectern_store::{HttpLectureStore, UpcomingResponse};

type Feed = Arc<Mutex<Option<Vec<Lecture>>>>;

#[derive(Default)]
struct ToastLog(Mutex<Vec<Toast>>);

impl ToastSink for ToastLog {
    fn show(&self, toast: Toast) {
        self.0.lock().unwrap().push(toast);
    }
}

fn lecture(id: i64, lesson: &str, time: &str) -> Lecture {
    Lecture {
        id: LectureId(id),
        teacher_name: "Ms. A".to_string(),
        lesson_name: lesson.to_string(),
        email: "a@school.edu".to_string(),
        time: time.to_string(),
    }
}

/// `None` in the feed makes the service answer 503.
async fn upcoming(State(feed): State<Feed>) -> Result<Json<UpcomingResponse>, StatusCode> {
    match feed.lock().unwrap().clone() {
        Some(reminders) => Ok(Json(UpcomingResponse { reminders })),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn spawn_feed(feed: Feed) -> String {
    let app = Router::new()
        .route("/api/upcoming/", get(upcoming))
        .with_state(feed);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn feed_changes_are_announced_once_each() {
    let feed: Feed = Arc::new(Mutex::new(Some(vec![lecture(1, "Algebra", "2024-01-01T10:00Z")])));
    let base = spawn_feed(feed.clone()).await;
    let store = Arc::new(HttpLectureStore::with_client(
        reqwest::Client::new(),
        &format!("{base}/api/lectures/"),
        &format!("{base}/api/upcoming/"),
    ));
    let toasts = Arc::new(ToastLog::default());
    let engine = ReminderEngine::new(store, toasts.clone());
    let active = ActiveFlag::new();

    assert_eq!(
        engine.poll_once(&active).await,
        PollOutcome::Applied { fetched: 1, notified: 1 }
    );

    *feed.lock().unwrap() = None;
    assert_eq!(engine.poll_once(&active).await, PollOutcome::Failed);
    assert_eq!(engine.upcoming().len(), 1);

    *feed.lock().unwrap() = Some(vec![
        lecture(1, "Algebra", "2024-01-01T10:00Z"),
        lecture(2, "Biology", "2024-01-01T10:10Z"),
    ]);
    assert_eq!(
        engine.poll_once(&active).await,
        PollOutcome::Applied { fetched: 2, notified: 1 }
    );

    let messages: Vec<String> = toasts
        .0
        .lock()
        .unwrap()
        .iter()
        .map(|t| t.message.clone())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Reminder: \"Algebra\" by Ms. A starts soon!",
            "Reminder: \"Biology\" by Ms. A starts soon!",
        ]
    );
    let keys: Vec<String> = engine
        .upcoming()
        .iter()
        .map(|e| e.notification_key.to_string())
        .collect();
    assert_eq!(keys, vec!["1-2024-01-01T10:00Z", "2-2024-01-01T10:10Z"]);
}
