use futures_util::{TryStreamExt, stream};
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use stats_export::db::{ExportSummary, derive_rows, replace_student_stats, write_json_lines};
use store::{
    db::{self, COURSE_COLLECTION, PROGRESS_COLLECTION, STUDENT_STATS_COLLECTION, USER_COLLECTION},
    memory::MemoryStore,
    model::*,
};

fn user() -> User {
    User {
        id: ObjectId::new(),
        name: "Lê Văn C".to_string(),
        email: "c@example.vn".to_string(),
        role: Role::Student,
        phone: None,
        company: Some("Xưởng cơ khí".to_string()),
        job_title: Some("Thợ hàn".to_string()),
        created_at: DateTime::now(),
    }
}

fn course() -> CourseDetail {
    let video = |title: &str| Video {
        id: ObjectId::new(),
        title: title.to_string(),
        url: format!("https://cdn.example.vn/{title}.mp4"),
        length: 30,
        can_seek: false,
        should_complete_to_passed: true,
    };
    CourseDetail {
        id: ObjectId::new(),
        title: "Hàn điện".to_string(),
        description: "Nghề hàn cơ bản".to_string(),
        category: CourseCategory::HocNghe,
        active: true,
        thumbnail: None,
        theory: vec![video("a"), video("b")],
        practice: vec![],
        exams: vec![],
        created_at: DateTime::now(),
    }
}

#[tokio::test]
async fn rows_skip_missing_users_and_courses() {
    let (u, c) = (user(), course());
    let store = MemoryStore::new().with_user(u.clone()).with_course(c.clone());

    let mut known = CourseProgress::empty(u.id, c.id, DateTime::now());
    known.completed_videos.push(CompletedVideo {
        section: Section::Theory,
        index: 1,
    });
    let orphan_user = CourseProgress::empty(ObjectId::new(), c.id, DateTime::now());
    let orphan_course = CourseProgress::empty(u.id, ObjectId::new(), DateTime::now());

    let progress = stream::iter(vec![Ok(known), Ok(orphan_user), Ok(orphan_course)]);
    let (rows, summary) = derive_rows(&store, progress).await.unwrap();

    assert_eq!(
        summary,
        ExportSummary {
            progress_read: 3,
            rows_written: 1,
            skipped: 2,
        }
    );
    assert_eq!(rows[0].user_id, u.id);
    assert_eq!(rows[0].course_title, "Hàn điện");
    assert_eq!(rows[0].completed_videos, 1);
    assert_eq!(rows[0].required_videos, 2);
    assert!(!rows[0].is_completed);
}

#[tokio::test]
async fn malformed_user_is_skipped_not_fatal() {
    let (good, c) = (user(), course());
    let mut bad = user();
    bad.name = "  ".to_string();
    let store = MemoryStore::new()
        .with_user(good.clone())
        .with_user(bad.clone())
        .with_course(c.clone());

    let progress = stream::iter(vec![
        Ok(CourseProgress::empty(bad.id, c.id, DateTime::now())),
        Ok(CourseProgress::empty(good.id, c.id, DateTime::now())),
        Ok(CourseProgress::empty(bad.id, c.id, DateTime::now())),
    ]);
    let (rows, summary) = derive_rows(&store, progress).await.unwrap();

    assert_eq!(
        summary,
        ExportSummary {
            progress_read: 3,
            rows_written: 1,
            skipped: 2,
        }
    );
    assert_eq!(rows[0].user_id, good.id);
}

#[tokio::test]
async fn json_lines_has_one_row_per_line() {
    let (u, c) = (user(), course());
    let store = MemoryStore::new().with_user(u.clone()).with_course(c.clone());
    let progress = stream::iter(vec![
        Ok(CourseProgress::empty(u.id, c.id, DateTime::now())),
        Ok(CourseProgress::empty(u.id, c.id, DateTime::now())),
    ]);
    let (rows, _) = derive_rows(&store, progress).await.unwrap();

    let path = std::env::temp_dir().join(format!("student-stats-{}.jsonl", ObjectId::new()));
    write_json_lines(&path, &rows).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["courseTitle"], "Hàn điện");
}

// Schema compatibility against a live database. Run with `--ignored` and `MONGODB_URI` set.

#[tokio::test]
#[ignore]
async fn course_schema_is_unchanged() {
    let mongo_uri = std::env::var("MONGODB_URI").unwrap();
    let client = db::client(&mongo_uri, "stats-export-tests").await.unwrap();
    let collection = db::get_collection::<CourseDetail>(&client, COURSE_COLLECTION).unwrap();
    let _courses: Vec<CourseDetail> = collection
        .find(doc! {})
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn progress_schema_is_unchanged() {
    let mongo_uri = std::env::var("MONGODB_URI").unwrap();
    let client = db::client(&mongo_uri, "stats-export-tests").await.unwrap();
    let collection = db::get_collection::<CourseProgress>(&client, PROGRESS_COLLECTION).unwrap();
    let _progress: Vec<CourseProgress> = collection
        .find(doc! {})
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn user_schema_is_unchanged() {
    let mongo_uri = std::env::var("MONGODB_URI").unwrap();
    let client = db::client(&mongo_uri, "stats-export-tests").await.unwrap();
    let collection = db::get_collection::<User>(&client, USER_COLLECTION).unwrap();
    let users: Vec<User> = collection
        .find(doc! {})
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    for user in &users {
        user.validate().unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn replacing_stats_swaps_the_whole_collection() {
    let mongo_uri = std::env::var("MONGODB_URI").unwrap();
    let client = db::client(&mongo_uri, "stats-export-tests").await.unwrap();
    let (u, c) = (user(), course());
    let store = MemoryStore::new().with_user(u.clone()).with_course(c.clone());
    let progress = stream::iter(vec![
        Ok(CourseProgress::empty(u.id, c.id, DateTime::now())),
        Ok(CourseProgress::empty(u.id, c.id, DateTime::now())),
    ]);
    let (rows, _) = derive_rows(&store, progress).await.unwrap();
    let collection = db::get_collection::<StudentStats>(&client, STUDENT_STATS_COLLECTION).unwrap();

    replace_student_stats(&client, &rows).await.unwrap();
    assert_eq!(collection.count_documents(doc! {}).await.unwrap(), 2);

    replace_student_stats(&client, &rows[..1]).await.unwrap();
    assert_eq!(collection.count_documents(doc! {}).await.unwrap(), 1);
}
