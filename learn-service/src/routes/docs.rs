//! Admin document management.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use course_utils::{parse_object_id, view::DocView};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use store::{Error, model::Doc};
use tracing::info;
use validator::Validate;

use crate::{auth::AuthUser, config::AppState, error::ApiResult, response::DataResponse};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocRequest {
    #[validate(length(min = 1))]
    title: String,
    description: Option<String>,
    #[validate(url)]
    file_url: String,
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    id: Option<String>,
}

#[derive(Serialize)]
pub struct Deleted {
    id: String,
}

pub async fn list_docs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<DocView>>>> {
    auth.ensure_admin()?;
    let docs = state.store.list_docs().await?;
    Ok(Json(DataResponse::new(docs.iter().map(DocView::from).collect())))
}

pub async fn get_doc(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<DocView>>> {
    auth.ensure_admin()?;
    let doc_id = parse_object_id("doc", &doc_id)?;
    let doc = state
        .store
        .find_doc(doc_id)
        .await?
        .ok_or_else(|| Error::not_found("doc", doc_id))?;
    Ok(Json(DataResponse::new(DocView::from(&doc))))
}

pub async fn create_doc(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<DocRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<DocView>>)> {
    auth.ensure_admin()?;
    let Json(body) = body?;
    body.validate()?;

    let now = DateTime::now();
    let doc = Doc {
        id: ObjectId::new(),
        title: body.title,
        description: body.description,
        file_url: body.file_url,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_doc(doc.clone()).await?;
    info!(doc = %doc.id, "doc created");

    Ok((StatusCode::CREATED, Json(DataResponse::new(DocView::from(&doc)))))
}

pub async fn update_doc(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    auth: AuthUser,
    body: Result<Json<DocRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<DocView>>> {
    auth.ensure_admin()?;
    let doc_id = parse_object_id("doc", &doc_id)?;
    let Json(body) = body?;
    body.validate()?;

    let existing = state
        .store
        .find_doc(doc_id)
        .await?
        .ok_or_else(|| Error::not_found("doc", doc_id))?;
    let doc = Doc {
        id: doc_id,
        title: body.title,
        description: body.description,
        file_url: body.file_url,
        created_at: existing.created_at,
        updated_at: DateTime::now(),
    };
    if !state.store.update_doc(doc.clone()).await? {
        return Err(Error::not_found("doc", doc_id).into());
    }
    info!(doc = %doc_id, "doc updated");

    Ok(Json(DataResponse::new(DocView::from(&doc))))
}

pub async fn delete_doc(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<Deleted>>> {
    auth.ensure_admin()?;
    let doc_id = parse_object_id("doc", &doc_id)?;
    remove(&state, doc_id).await
}

/// `DELETE /docs?id=<docId>`
pub async fn delete_doc_by_query(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<Deleted>>> {
    auth.ensure_admin()?;
    let Query(query) = query?;
    let doc_id = match query.id.as_deref() {
        Some(id) if !id.is_empty() => parse_object_id("doc", id)?,
        _ => return Err(Error::Validation("id is required".to_string()).into()),
    };
    remove(&state, doc_id).await
}

async fn remove(state: &AppState, doc_id: ObjectId) -> ApiResult<Json<DataResponse<Deleted>>> {
    if !state.store.delete_doc(doc_id).await? {
        return Err(Error::not_found("doc", doc_id).into());
    }
    info!(doc = %doc_id, "doc deleted");
    Ok(Json(DataResponse::new(Deleted {
        id: doc_id.to_hex(),
    })))
}
