use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "jobTitle")]
    pub job_title: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl User {
    /// Rejects records that deserialize but are unusable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Store(format!("user {} has an empty name", self.id)));
        }
        if !self.email.contains('@') {
            return Err(Error::Store(format!(
                "user {} has a malformed email",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: ObjectId::new(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Student,
            phone: None,
            company: None,
            job_title: None,
            created_at: DateTime::now(),
        }
    }

    #[test]
    fn rejects_blank_name_and_bad_email() {
        assert!(user("  ", "a@b.vn").validate().is_err());
        assert!(user("Lan", "not-an-email").validate().is_err());
        assert!(user("Lan", "lan@example.vn").validate().is_ok());
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "Minh",
            "email": "minh@example.vn",
            "role": "admin",
            "createdAt": DateTime::now(),
        };
        let user: User = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.company.is_none());
    }
}
