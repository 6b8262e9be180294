use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    bson::{Bson, DateTime, doc, oid::ObjectId, to_bson},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
};
use tracing::{debug, instrument};

use crate::{
    DocumentStore,
    error::{Error, Result},
    model::*,
};

pub const COURSE_COLLECTION: &str = "Course";
pub const PROGRESS_COLLECTION: &str = "CourseProgress";
pub const USER_COLLECTION: &str = "User";
pub const DOC_COLLECTION: &str = "Doc";
pub const VERIFICATION_COLLECTION: &str = "LearnVerification";
pub const STUDENT_STATS_COLLECTION: &str = "StudentStats";

const DUPLICATE_KEY_CODE: i32 = 11000;

pub fn get_collection<T>(client: &Client, collection_name: &str) -> Result<Collection<T>>
where
    T: Send + Sync,
{
    let db = client
        .default_database()
        .ok_or_else(|| Error::Store("database needs to be defined in the URI".to_string()))?;

    Ok(db.collection::<T>(collection_name))
}

pub async fn client(uri: &str, app_name: &str) -> Result<Client> {
    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.app_name = Some(app_name.to_string());

    let client = Client::with_options(client_options)?;

    // Ping the server to see if you can connect to the cluster
    client
        .default_database()
        .ok_or_else(|| Error::Store("database needs to be defined in the URI".to_string()))?
        .run_command(doc! {"ping": 1})
        .await?;

    Ok(client)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

/// `DocumentStore` backed by MongoDB.
#[derive(Clone, Debug)]
pub struct MongoStore {
    courses: Collection<CourseDetail>,
    users: Collection<User>,
    progress: Collection<CourseProgress>,
    docs: Collection<Doc>,
    verifications: Collection<VerificationRecord>,
}

impl MongoStore {
    pub fn new(client: &Client) -> Result<Self> {
        Ok(MongoStore {
            courses: get_collection(client, COURSE_COLLECTION)?,
            users: get_collection(client, USER_COLLECTION)?,
            progress: get_collection(client, PROGRESS_COLLECTION)?,
            docs: get_collection(client, DOC_COLLECTION)?,
            verifications: get_collection(client, VERIFICATION_COLLECTION)?,
        })
    }

    /// One progress document and one verification per `(user, course)`.
    #[instrument(skip_all, err(Debug))]
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique_user_course = || {
            IndexModel::builder()
                .keys(doc! {"userId": 1, "courseId": 1})
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };
        self.progress.create_index(unique_user_course()).await?;
        self.verifications.create_index(unique_user_course()).await?;
        debug!("indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_course(&self, course_id: ObjectId) -> Result<Option<CourseDetail>> {
        Ok(self.courses.find_one(doc! {"_id": course_id}).await?)
    }

    async fn list_courses(&self, kind: CourseKind) -> Result<Vec<CourseDetail>> {
        let mut filter = doc! {"active": true};
        if let Some(category) = kind.category() {
            filter.insert("category", to_bson(&category)?);
        }
        let courses = self.courses.find(filter).await?.try_collect().await?;
        Ok(courses)
    }

    async fn find_user(&self, user_id: ObjectId) -> Result<Option<User>> {
        let user = self.users.find_one(doc! {"_id": user_id}).await?;
        if let Some(user) = &user {
            user.validate()?;
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users: Vec<User> = self.users.find(doc! {}).await?.try_collect().await?;
        users.iter().try_for_each(User::validate)?;
        Ok(users)
    }

    async fn find_progress(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<CourseProgress>> {
        Ok(self
            .progress
            .find_one(doc! {"userId": user_id, "courseId": course_id})
            .await?)
    }

    async fn list_progress(&self, user_id: ObjectId) -> Result<Vec<CourseProgress>> {
        let progress = self
            .progress
            .find(doc! {"userId": user_id})
            .await?
            .try_collect()
            .await?;
        Ok(progress)
    }

    #[instrument(skip(self), err(Debug))]
    async fn add_completed_video(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        video: CompletedVideo,
        now: DateTime,
    ) -> Result<CourseProgress> {
        let video = to_bson(&video)?;
        self.progress
            .find_one_and_update(
                doc! {"userId": user_id, "courseId": course_id},
                doc! {
                    "$addToSet": {"completedVideos": video},
                    "$set": {"lastUpdatedAt": now},
                    "$setOnInsert": {
                        "examAttempts": [],
                        "isCompleted": false,
                        "startedAt": now,
                        "completedAt": Bson::Null,
                    },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| Error::Store("progress upsert returned no document".to_string()))
    }

    #[instrument(skip(self, attempt), err(Debug))]
    async fn push_exam_attempt(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        attempt: ExamAttempt,
        now: DateTime,
    ) -> Result<CourseProgress> {
        let attempt = to_bson(&attempt)?;
        self.progress
            .find_one_and_update(
                doc! {"userId": user_id, "courseId": course_id},
                doc! {
                    "$push": {"examAttempts": attempt},
                    "$set": {"lastUpdatedAt": now},
                    "$setOnInsert": {
                        "completedVideos": [],
                        "isCompleted": false,
                        "startedAt": now,
                        "completedAt": Bson::Null,
                    },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| Error::Store("progress upsert returned no document".to_string()))
    }

    #[instrument(skip(self, snapshot), fields(progress = %snapshot.id), err(Debug))]
    async fn set_completed(
        &self,
        snapshot: &CourseProgress,
        completed: bool,
        now: DateTime,
    ) -> Result<bool> {
        let completed_at = if completed { Bson::DateTime(now) } else { Bson::Null };
        let res = self
            .progress
            .update_one(
                doc! {
                    "_id": snapshot.id,
                    "completedVideos": to_bson(&snapshot.completed_videos)?,
                    "examAttempts": to_bson(&snapshot.exam_attempts)?,
                },
                doc! {"$set": {"isCompleted": completed, "completedAt": completed_at}},
            )
            .await?;
        Ok(res.matched_count > 0)
    }

    #[instrument(skip(self), err(Debug))]
    async fn clear_exam_group(
        &self,
        user_id: ObjectId,
        group_id: ObjectId,
        now: DateTime,
    ) -> Result<u64> {
        let res = self
            .progress
            .update_many(
                doc! {"userId": user_id, "examAttempts.groupId": group_id},
                doc! {
                    "$pull": {"examAttempts": {"groupId": group_id}},
                    "$set": {
                        "isCompleted": false,
                        "completedAt": Bson::Null,
                        "lastUpdatedAt": now,
                    },
                },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn list_docs(&self) -> Result<Vec<Doc>> {
        Ok(self.docs.find(doc! {}).await?.try_collect().await?)
    }

    async fn find_doc(&self, doc_id: ObjectId) -> Result<Option<Doc>> {
        Ok(self.docs.find_one(doc! {"_id": doc_id}).await?)
    }

    async fn insert_doc(&self, doc: Doc) -> Result<()> {
        self.docs.insert_one(&doc).await?;
        Ok(())
    }

    async fn update_doc(&self, doc: Doc) -> Result<bool> {
        let res = self.docs.replace_one(doc! {"_id": doc.id}, &doc).await?;
        Ok(res.matched_count > 0)
    }

    async fn delete_doc(&self, doc_id: ObjectId) -> Result<bool> {
        let res = self.docs.delete_one(doc! {"_id": doc_id}).await?;
        Ok(res.deleted_count > 0)
    }

    async fn find_verification(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<Option<VerificationRecord>> {
        Ok(self
            .verifications
            .find_one(doc! {"userId": user_id, "courseId": course_id})
            .await?)
    }

    async fn insert_verification(&self, record: VerificationRecord) -> Result<bool> {
        // `_id` is immutable, so an existing record keeps its id
        let res = self
            .verifications
            .update_one(
                doc! {
                    "userId": record.user_id,
                    "courseId": record.course_id,
                    "sessionId": {"$ne": &record.session_id},
                },
                doc! {
                    "$set": {
                        "sessionId": &record.session_id,
                        "photoKey": &record.photo_key,
                        "acceptedAt": record.accepted_at,
                    },
                    "$setOnInsert": {"_id": record.id},
                },
            )
            .upsert(true)
            .await;
        match res {
            Ok(_) => Ok(true),
            // Same session already holds the record, so the upsert hit the unique index
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_verification(&self, user_id: ObjectId, course_id: ObjectId) -> Result<bool> {
        let res = self
            .verifications
            .delete_one(doc! {"userId": user_id, "courseId": course_id})
            .await?;
        Ok(res.deleted_count > 0)
    }
}
