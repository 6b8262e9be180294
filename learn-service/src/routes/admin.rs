use axum::{Json, extract::State};
use course_utils::view::UserView;

use crate::{auth::AuthUser, config::AppState, error::ApiResult, response::DataResponse};

pub async fn get_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<UserView>>>> {
    auth.ensure_admin()?;
    let users = state.store.list_users().await?;
    Ok(Json(DataResponse::new(
        users.iter().map(UserView::from).collect(),
    )))
}
