use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use course_utils::{
    grading::Answer,
    parse_object_id,
    view::{AttemptView, CompletedCourse, ProgressView, UserView},
};
use serde::{Deserialize, Serialize};
use store::{Error, model::Section};

use crate::{
    auth::AuthUser, config::AppState, error::ApiResult, response::DataResponse,
};

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<UserView>>> {
    let user_id = parse_object_id("user", &user_id)?;
    auth.ensure_self_or_admin(user_id)?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;
    Ok(Json(DataResponse::new(UserView::from(&user))))
}

pub async fn get_completed_courses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<CompletedCourse>>>> {
    let user_id = parse_object_id("user", &user_id)?;
    auth.ensure_self_or_admin(user_id)?;

    let courses = state.tracker.completed_courses(user_id).await?;
    Ok(Json(DataResponse::new(courses)))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<ProgressView>>> {
    let user_id = parse_object_id("user", &user_id)?;
    let course_id = parse_object_id("course", &course_id)?;
    auth.ensure_self_or_admin(user_id)?;

    let progress = state.tracker.get_progress(user_id, course_id).await?;
    Ok(Json(DataResponse::new(progress)))
}

#[derive(Deserialize)]
pub struct VideoCompleteRequest {
    section: Section,
    index: u32,
}

pub async fn post_video_complete(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
    auth: AuthUser,
    body: Result<Json<VideoCompleteRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<ProgressView>>> {
    let user_id = parse_object_id("user", &user_id)?;
    let course_id = parse_object_id("course", &course_id)?;
    auth.ensure_self_or_admin(user_id)?;
    let Json(body) = body?;

    let progress = state
        .tracker
        .mark_video_completed(user_id, course_id, body.section, body.index)
        .await?;
    Ok(Json(DataResponse::new(ProgressView::new(
        &course_id,
        Some(&progress),
    ))))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    question_id: String,
    answer_id: String,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    answers: Vec<AnswerRequest>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    attempt: AttemptView,
    progress: ProgressView,
}

pub async fn post_exam_submit(
    State(state): State<AppState>,
    Path((user_id, course_id, exam_id)): Path<(String, String, String)>,
    auth: AuthUser,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<SubmitResponse>>)> {
    let user_id = parse_object_id("user", &user_id)?;
    let course_id = parse_object_id("course", &course_id)?;
    let exam_id = parse_object_id("exam", &exam_id)?;
    auth.ensure_self_or_admin(user_id)?;
    let Json(body) = body?;

    let answers = body
        .answers
        .iter()
        .map(|a| {
            Ok(Answer {
                question_id: parse_object_id("question", &a.question_id)?,
                answer_id: parse_object_id("option", &a.answer_id)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let result = state
        .tracker
        .record_exam_result(user_id, course_id, exam_id, &answers)
        .await?;

    let response = SubmitResponse {
        attempt: AttemptView::from(&result.attempt),
        progress: ProgressView::new(&course_id, Some(&result.progress)),
    };
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetakeResponse {
    group_id: String,
    cleared: u64,
}

pub async fn post_exam_retake(
    State(state): State<AppState>,
    Path((user_id, group_id)): Path<(String, String)>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<RetakeResponse>>> {
    let user_id = parse_object_id("user", &user_id)?;
    let group_id = parse_object_id("group", &group_id)?;
    auth.ensure_self_or_admin(user_id)?;

    let cleared = state.tracker.retake_exam(user_id, group_id).await?;
    Ok(Json(DataResponse::new(RetakeResponse {
        group_id: group_id.to_hex(),
        cleared,
    })))
}
