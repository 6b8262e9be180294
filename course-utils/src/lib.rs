//! Course Utility Functions
//!
//! ## Current API
//!
//! - Grade exam submissions
//! - Track video and exam progress
//! - Resolve course content for a viewer
//! - Gate the learn flow behind identity verification
//! - Validate course definitions
//! - Derive student report rows
//!
pub mod gate;
pub mod grading;
pub mod progress;
pub mod resolver;
pub mod stats;
pub mod tracker;
pub mod validation;
pub mod view;

#[cfg(test)]
mod testing;

use mongodb::bson::oid::ObjectId;
use store::Error;

/// Parses a hex id taken from user input.
pub fn parse_object_id(entity: &str, id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::Validation(format!("invalid {entity} id: {id:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::ErrorKind;

    #[test]
    fn malformed_id_is_validation_error() {
        let err = parse_object_id("course", "not-an-id").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let id = ObjectId::new();
        assert_eq!(parse_object_id("course", &id.to_hex()).unwrap(), id);
    }
}
