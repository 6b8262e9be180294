use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Store(String),
    // Froms
    #[error("{0}")]
    MongoDB(#[from] mongodb::error::Error),
    #[error("{0}")]
    BsonSerialization(#[from] mongodb::bson::ser::Error),
    #[error("{0}")]
    BsonDeserialization(#[from] mongodb::bson::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used at the API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "ValidationError")]
    Validation,
    #[serde(rename = "AuthError")]
    Auth,
    #[serde(rename = "NotFoundError")]
    NotFound,
    #[serde(rename = "StoreError")]
    Store,
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Auth(_) => ErrorKind::Auth,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Store(_)
            | Error::MongoDB(_)
            | Error::BsonSerialization(_)
            | Error::BsonDeserialization(_) => ErrorKind::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_are_store_errors() {
        let err: Error = mongodb::bson::from_document::<String>(mongodb::bson::doc! {})
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Store);
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = Error::not_found("course", "abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "course abc not found");
    }
}
