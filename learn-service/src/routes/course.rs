use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use course_utils::{
    parse_object_id,
    view::{CoursePreview, CourseView},
};
use serde::Deserialize;
use store::model::CourseKind;

use crate::{
    auth::AuthUser, config::AppState, error::ApiResult, response::DataResponse,
};

#[derive(Deserialize)]
pub struct ListQuery {
    kind: Option<String>,
}

pub async fn get_course_list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<Vec<CoursePreview>>>> {
    let Query(query) = query?;
    let kind = match query.kind.as_deref() {
        None | Some("") => CourseKind::All,
        Some(kind) => kind.parse()?,
    };

    let courses = state.resolver.get_course_list(kind).await?;
    Ok(Json(DataResponse::new(courses)))
}

pub async fn get_course_preview(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<DataResponse<CoursePreview>>> {
    let course_id = parse_object_id("course", &course_id)?;
    let preview = state.resolver.get_course_preview(course_id).await?;
    Ok(Json(DataResponse::new(preview)))
}

pub async fn get_course_detail(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    viewer: Option<AuthUser>,
) -> ApiResult<Json<DataResponse<CourseView>>> {
    let course_id = parse_object_id("course", &course_id)?;
    let view = state
        .resolver
        .get_course_detail(course_id, viewer.map(|u| u.user_id))
        .await?;
    Ok(Json(DataResponse::new(view)))
}
