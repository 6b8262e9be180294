use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use store::{
    DocumentStore, Error, Result,
    model::{CourseDetail, CourseKind},
};
use tracing::{error, instrument, warn};

use crate::{
    validation::validate_course,
    view::{CoursePreview, CourseView},
};

/// Loads a published course. Absent and inactive courses are both `NotFound`.
pub async fn load_course(store: &dyn DocumentStore, course_id: ObjectId) -> Result<CourseDetail> {
    let course = store
        .find_course(course_id)
        .await?
        .filter(|c| c.active)
        .ok_or_else(|| Error::not_found("course", course_id))?;

    if let Err(reason) = validate_course(&course) {
        error!(course = %course_id, %reason, "stored course is malformed");
        return Err(Error::Store(format!("course {course_id} is malformed")));
    }

    Ok(course)
}

#[derive(Clone)]
pub struct CourseResolver {
    store: Arc<dyn DocumentStore>,
}

impl CourseResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        CourseResolver { store }
    }

    /// Summary safe for anonymous listing views.
    pub async fn get_course_preview(&self, course_id: ObjectId) -> Result<CoursePreview> {
        let course = load_course(self.store.as_ref(), course_id).await?;
        Ok(CoursePreview::from(&course))
    }

    /// Course content merged with the viewer's progress.
    ///
    /// Course and progress are read independently; a progress write landing in
    /// between is picked up by the next read.
    #[instrument(skip(self), err(Debug))]
    pub async fn get_course_detail(
        &self,
        course_id: ObjectId,
        viewer: Option<ObjectId>,
    ) -> Result<CourseView> {
        let user_id =
            viewer.ok_or_else(|| Error::Auth("sign in to view course content".to_string()))?;

        let course = load_course(self.store.as_ref(), course_id).await?;
        let progress = self.store.find_progress(user_id, course_id).await?;

        Ok(CourseView::new(&course, progress.as_ref()))
    }

    pub async fn get_course_list(&self, kind: CourseKind) -> Result<Vec<CoursePreview>> {
        let courses = self.store.list_courses(kind).await?;

        let previews = courses
            .iter()
            .filter(|course| match validate_course(course) {
                Ok(()) => true,
                Err(reason) => {
                    warn!(course = %course.id, %reason, "skipping malformed course in listing");
                    false
                }
            })
            .map(CoursePreview::from)
            .collect();

        Ok(previews)
    }
}
