//! User profile, the single-record collection.
//!
//! The same struct serves as read model and merge patch: `Some` fields are
//! written, `None` fields are left untouched.

use super::record::{decode_document, to_field_map, Document, FieldMap, RecordError};
use serde::{Deserialize, Serialize};

/// Collection holding the profile document.
pub const PROFILE_COLLECTION: &str = "profile";
/// Fixed document id of the profile inside the owner partition.
pub const PROFILE_DOCUMENT_ID: &str = "me";
pub const FIELD_PROFILE_IMAGE: &str = "profileImage";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Retrievable URL of the uploaded avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges `patch` into `self`, mirroring the store-side merge.
    pub fn merge(&mut self, patch: &UserProfile) {
        if patch.first_name.is_some() {
            self.first_name.clone_from(&patch.first_name);
        }
        if patch.last_name.is_some() {
            self.last_name.clone_from(&patch.last_name);
        }
        if patch.email.is_some() {
            self.email.clone_from(&patch.email);
        }
        if patch.profile_image.is_some() {
            self.profile_image.clone_from(&patch.profile_image);
        }
    }

    pub fn to_fields(&self) -> Result<FieldMap, RecordError> {
        to_field_map(self)
    }

    /// Decodes the profile; envelope keys are ignored.
    pub fn from_document(document: Document) -> Result<Self, RecordError> {
        decode_document(PROFILE_COLLECTION, document)
    }

    /// Display name built from first and last name, when any is set.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UserProfile;

    #[test]
    fn merge_keeps_unspecified_fields() {
        let mut profile = UserProfile {
            first_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            ..UserProfile::default()
        };
        profile.merge(&UserProfile {
            last_name: Some("Lovelace".to_string()),
            ..UserProfile::default()
        });
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.display_name().as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn empty_patch_serializes_to_empty_map() {
        assert!(UserProfile::default().to_fields().unwrap().is_empty());
    }
}
