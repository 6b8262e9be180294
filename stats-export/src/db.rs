use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    pin::pin,
};

use anyhow::Context;
use course_utils::stats::student_stats;
use futures_util::{Stream, StreamExt};
use mongodb::{
    Client,
    bson::{doc, oid::ObjectId},
};
use store::{
    DocumentStore, Error,
    db::{MongoStore, PROGRESS_COLLECTION, STUDENT_STATS_COLLECTION, client, get_collection},
    model::{CourseDetail, CourseProgress, StudentStats, User},
};
use tracing::{debug, info, warn};

use crate::config::EnvVars;

const STAGING_SUFFIX: &str = "_staging";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub progress_read: usize,
    pub rows_written: usize,
    pub skipped: usize,
}

/// Rebuilds the `StudentStats` collection from every progress document
/// Optionally mirrors the rows to `EXPORT_PATH` as JSON lines
///
/// Rows are written to a staging collection which is then renamed over the
/// previous export, so a failed run leaves the last export in place.
#[tracing::instrument(skip_all, err(Debug))]
pub async fn export_student_stats(env_vars: &EnvVars) -> anyhow::Result<ExportSummary> {
    let client = client(&env_vars.mongodb_uri, env!("CARGO_PKG_NAME"))
        .await
        .context("unable to connect to MongoDB")?;
    let store = MongoStore::new(&client)?;
    let progress_collection = get_collection::<CourseProgress>(&client, PROGRESS_COLLECTION)?;

    let progress_cursor = progress_collection.find(doc! {}).await?;
    let (rows, summary) = derive_rows(&store, progress_cursor).await?;

    replace_student_stats(&client, &rows).await?;
    if let Some(path) = &env_vars.export_path {
        write_json_lines(path, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "wrote export file");
    }

    Ok(summary)
}

/// Swaps `rows` in as the whole `StudentStats` collection.
pub async fn replace_student_stats(client: &Client, rows: &[StudentStats]) -> anyhow::Result<()> {
    let db = client
        .default_database()
        .context("database needs to be defined in the URI")?;
    let staging_name = format!("{STUDENT_STATS_COLLECTION}{STAGING_SUFFIX}");
    let staging = get_collection::<StudentStats>(client, &staging_name)?;

    staging
        .drop()
        .await
        .context("unable to clear staging collection")?;
    db.create_collection(&staging_name)
        .await
        .context("unable to create staging collection")?;
    if !rows.is_empty() {
        staging
            .insert_many(rows)
            .await
            .context("unable to insert student stats")?;
    }

    client
        .database("admin")
        .run_command(doc! {
            "renameCollection": format!("{}.{staging_name}", db.name()),
            "to": format!("{}.{STUDENT_STATS_COLLECTION}", db.name()),
            "dropTarget": true,
        })
        .await
        .context("unable to replace student stats")?;
    debug!(rows = rows.len(), "replaced previous export");
    Ok(())
}

/// One row per progress document. Users and courses are fetched once per run.
///
/// Progress whose user or course no longer exists, or whose user record is
/// malformed, is skipped.
pub async fn derive_rows<S>(
    store: &dyn DocumentStore,
    progress: S,
) -> anyhow::Result<(Vec<StudentStats>, ExportSummary)>
where
    S: Stream<Item = mongodb::error::Result<CourseProgress>>,
{
    let mut users: HashMap<ObjectId, Option<User>> = HashMap::new();
    let mut courses: HashMap<ObjectId, Option<CourseDetail>> = HashMap::new();
    let mut rows = vec![];
    let mut summary = ExportSummary::default();

    let mut progress = pin!(progress);
    while let Some(p) = progress.next().await {
        let p = p.context("unable to deserialize progress")?;
        summary.progress_read += 1;

        if !users.contains_key(&p.user_id) {
            let user = match store.find_user(p.user_id).await {
                Ok(user) => user,
                Err(Error::Store(reason)) => {
                    warn!(user = %p.user_id, %reason, "malformed user");
                    None
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("unable to load user {}", p.user_id));
                }
            };
            users.insert(p.user_id, user);
        }
        if !courses.contains_key(&p.course_id) {
            let course = store
                .find_course(p.course_id)
                .await
                .with_context(|| format!("unable to load course {}", p.course_id))?;
            courses.insert(p.course_id, course);
        }

        let user = users.get(&p.user_id).and_then(Option::as_ref);
        let course = courses.get(&p.course_id).and_then(Option::as_ref);
        let (Some(user), Some(course)) = (user, course) else {
            warn!(
                progress = %p.id,
                user = %p.user_id,
                course = %p.course_id,
                "skipping progress with missing or malformed user or course"
            );
            summary.skipped += 1;
            continue;
        };

        rows.push(student_stats(user, course, &p));
    }

    summary.rows_written = rows.len();
    Ok((rows, summary))
}

pub fn write_json_lines(path: &Path, rows: &[StudentStats]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
