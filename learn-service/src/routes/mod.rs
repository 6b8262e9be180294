use axum::{
    Router,
    routing::{get, post},
};

use crate::config::AppState;

pub mod admin;
pub mod course;
pub mod docs;
pub mod learn;
pub mod status;
pub mod user;

/// Everything mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/course/lists", get(course::get_course_list))
        .route("/course/{course_id}/preview", get(course::get_course_preview))
        .route("/course/{course_id}", get(course::get_course_detail))
        .route("/user/{user_id}", get(user::get_user))
        .route(
            "/user/{user_id}/course/completed",
            get(user::get_completed_courses),
        )
        .route(
            "/user/{user_id}/course/{course_id}/progress",
            get(user::get_progress),
        )
        .route(
            "/user/{user_id}/course/{course_id}/video/complete",
            post(user::post_video_complete),
        )
        .route(
            "/user/{user_id}/course/{course_id}/exam/{exam_id}/submit",
            post(user::post_exam_submit),
        )
        .route(
            "/user/{user_id}/course/exam/retake/{group_id}",
            post(user::post_exam_retake),
        )
        .route(
            "/user/{user_id}/course/{course_id}/verification",
            post(learn::post_verification),
        )
        .route(
            "/user/{user_id}/course/{course_id}/learn",
            get(learn::get_learn),
        )
        .route(
            "/user/{user_id}/course/{course_id}/learn/exit",
            post(learn::post_learn_exit),
        )
        .route("/admin/users", get(admin::get_users))
        .route(
            "/docs",
            get(docs::list_docs)
                .post(docs::create_doc)
                .delete(docs::delete_doc_by_query),
        )
        .route(
            "/docs/{doc_id}",
            get(docs::get_doc)
                .put(docs::update_doc)
                .delete(docs::delete_doc),
        )
}
