use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Downloadable training material managed from the admin dashboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime,
}
