#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use course_utils::grading::PassingPolicy;
use http_body_util::BodyExt;
use learn_service::{
    app,
    auth::{Claims, encode_token},
    config::{AppState, EnvVars, Environment},
    error::ApiError,
    photos::{Photo, PhotoStorage},
};
use mongodb::bson::{DateTime, oid::ObjectId};
use store::{memory::MemoryStore, model::*};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn test_env_vars() -> EnvVars {
    EnvVars {
        bucket_name: "test-bucket".to_string(),
        environment: Environment::Development,
        jwt_secret: SECRET.to_string(),
        mongodb_uri: "mongodb://localhost:27017/learn-test".to_string(),
        passing_policy: PassingPolicy::AllCorrect,
        port: 0,
        request_body_size_limit: 1024 * 1024,
        request_timeout_in_ms: 30_000,
        sentry_dsn: None,
    }
}

/// Keeps uploaded photos in memory.
#[derive(Default)]
pub struct MemoryPhotos {
    pub stored: Mutex<Vec<(String, Photo)>>,
}

impl MemoryPhotos {
    pub fn keys(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotos {
    async fn put_photo(&self, key: &str, photo: Photo) -> Result<(), ApiError> {
        self.stored.lock().unwrap().push((key.to_string(), photo));
        Ok(())
    }

    async fn delete_photo(&self, key: &str) -> Result<(), ApiError> {
        self.stored.lock().unwrap().retain(|(k, _)| k != key);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub photos: Arc<MemoryPhotos>,
}

pub fn test_app(store: MemoryStore) -> TestApp {
    let store = Arc::new(store);
    let photos = Arc::new(MemoryPhotos::default());
    let state = AppState::new(store.clone(), photos.clone(), test_env_vars());
    TestApp {
        router: app(state),
        store,
        photos,
    }
}

pub fn token(user_id: ObjectId, role: Role, session: &str) -> String {
    let claims = Claims {
        sub: user_id.to_hex(),
        role,
        sid: session.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode_token(&claims, SECRET).unwrap()
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

pub fn user(role: Role) -> User {
    User {
        id: ObjectId::new(),
        name: "Trần Thị B".to_string(),
        email: "b@example.vn".to_string(),
        role,
        phone: Some("0900000000".to_string()),
        company: None,
        job_title: None,
        created_at: DateTime::now(),
    }
}

pub fn video(title: &str, length: u32, required: bool) -> Video {
    Video {
        id: ObjectId::new(),
        title: title.to_string(),
        url: format!("https://cdn.example.vn/{title}.mp4"),
        length,
        can_seek: !required,
        should_complete_to_passed: required,
    }
}

pub fn exam(questions: usize) -> Exam {
    Exam {
        id: ObjectId::new(),
        group_id: ObjectId::new(),
        title: "Bài kiểm tra".to_string(),
        time_limit_in_s: 600,
        passing_percent: None,
        questions: (0..questions)
            .map(|i| {
                let options: Vec<QuestionOption> = (0..3)
                    .map(|o| QuestionOption {
                        id: ObjectId::new(),
                        text: format!("Đáp án {o}"),
                    })
                    .collect();
                Question {
                    id: ObjectId::new(),
                    text: format!("Câu hỏi {i}"),
                    answer: options[2].id,
                    options,
                }
            })
            .collect(),
    }
}

/// One required theory video, one optional practice video, one exam of two questions.
pub fn course(category: CourseCategory) -> CourseDetail {
    CourseDetail {
        id: ObjectId::new(),
        title: "Khóa học".to_string(),
        description: "Mô tả".to_string(),
        category,
        active: true,
        thumbnail: None,
        theory: vec![video("theory-1", 60, true)],
        practice: vec![video("practice-1", 45, false)],
        exams: vec![exam(2)],
        created_at: DateTime::now(),
    }
}

pub fn correct_answers(exam: &Exam) -> serde_json::Value {
    let answers: Vec<_> = exam
        .questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "questionId": q.id.to_hex(),
                "answerId": q.answer.to_hex(),
            })
        })
        .collect();
    serde_json::json!({ "answers": answers })
}
