use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use course_utils::{gate::VerificationState, parse_object_id, progress::Cursor};
use serde::{Deserialize, Serialize};
use store::model::Section;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    auth::AuthUser,
    config::AppState,
    error::ApiResult,
    photos::{Photo, photo_key},
    response::DataResponse,
};

#[derive(Deserialize, Validate)]
pub struct CaptureRequest {
    /// `data:image/jpeg;base64,...`
    #[validate(length(min = 1))]
    image: String,
}

#[derive(Serialize)]
pub struct GateResponse {
    state: VerificationState,
}

/// Position of the player, `?section=practice&index=2`.
#[derive(Deserialize)]
pub struct CursorQuery {
    section: Option<Section>,
    index: Option<u32>,
}

impl From<CursorQuery> for Cursor {
    fn from(query: CursorQuery) -> Self {
        Cursor {
            section: query.section.unwrap_or(Section::Theory),
            video_index: query.index,
        }
    }
}

/// Where a learner without a verified session is sent.
pub fn capture_path(user_id: &str, course_id: &str) -> String {
    format!("/api/v1/user/{user_id}/course/{course_id}/verification")
}

pub async fn post_verification(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
    auth: AuthUser,
    body: Result<Json<CaptureRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<GateResponse>>)> {
    let user_id = parse_object_id("user", &user_id)?;
    let course_id = parse_object_id("course", &course_id)?;
    auth.ensure_self(user_id)?;
    let Json(body) = body?;
    body.validate()?;
    let photo = Photo::from_data_url(body.image)?;

    state.resolver.get_course_preview(course_id).await?;
    state
        .gate
        .ensure_capture_allowed(user_id, course_id, &auth.session_id)
        .await?;

    let key = photo_key(&user_id, &course_id);
    state.photos.put_photo(&key, photo).await?;

    let verification = match state
        .gate
        .accept_capture(user_id, course_id, &auth.session_id, key.clone())
        .await
    {
        Ok(verification) => verification,
        Err(e) => {
            // Another capture in this session was accepted while this one uploaded
            if let Err(delete_err) = state.photos.delete_photo(&key).await {
                warn!(key = %key, "unable to delete rejected photo: {delete_err:?}");
            }
            return Err(e.into());
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GateResponse {
            state: verification,
        })),
    ))
}

/// Course content for a verified session, otherwise `303 See Other` to the capture step.
pub async fn get_learn(
    State(state): State<AppState>,
    Path((user_id_hex, course_id_hex)): Path<(String, String)>,
    auth: AuthUser,
    cursor: Result<Query<CursorQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(cursor) = cursor?;
    let user_id = parse_object_id("user", &user_id_hex)?;
    let course_id = parse_object_id("course", &course_id_hex)?;
    auth.ensure_self(user_id)?;

    if !state
        .gate
        .can_enter_learn_flow(user_id, course_id, &auth.session_id)
        .await?
    {
        info!(user = %user_id, course = %course_id, "redirecting to verification");
        return Ok(Redirect::to(&capture_path(&user_id_hex, &course_id_hex)).into_response());
    }

    let view = state
        .resolver
        .get_course_detail(course_id, Some(user_id))
        .await?
        .with_cursor(cursor.into());
    Ok(Json(DataResponse::new(view)).into_response())
}

pub async fn post_learn_exit(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<GateResponse>>> {
    let user_id = parse_object_id("user", &user_id)?;
    let course_id = parse_object_id("course", &course_id)?;
    auth.ensure_self(user_id)?;

    let verification = state.gate.exit_learn_flow(user_id, course_id).await?;
    Ok(Json(DataResponse::new(GateResponse {
        state: verification,
    })))
}
