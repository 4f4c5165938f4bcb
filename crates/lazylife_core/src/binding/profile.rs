//! Single-record variant of the binding for the user profile.
//!
//! # Invariants
//! - The profile lives at a fixed document id inside the owner partition.
//! - Writes are merges; unspecified profile fields are never cleared.
//! - An avatar URL is persisted only after its upload succeeded.
//! - An uploaded avatar whose URL could not be saved is deleted again.

use super::collection::{error_code, persistence};
use super::error::{BindingError, BindingResult, Operation};
use super::notify::{outcome_message, Notifier};
use crate::model::profile::{
    UserProfile, FIELD_PROFILE_IMAGE, PROFILE_COLLECTION, PROFILE_DOCUMENT_ID,
};
use crate::model::record::{FieldMap, OwnerId, RecordError, RecordId};
use crate::store::{DocumentStore, ObjectStore, StoreError};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;

const PROFILE_LABEL: &str = "profile";
const PROFILE_IMAGE_LABEL: &str = "profile picture";
const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Profile binding over a document store and an object store.
pub struct ProfileBinding<S: DocumentStore, O: ObjectStore, N: Notifier> {
    store: S,
    objects: O,
    notifier: N,
    /// Fresh reads only; `Some(None)` means "fetched, no profile yet".
    cache: HashMap<OwnerId, Option<UserProfile>>,
}

impl<S: DocumentStore, O: ObjectStore, N: Notifier> ProfileBinding<S, O, N> {
    pub fn new(store: S, objects: O, notifier: N) -> Self {
        Self {
            store,
            objects,
            notifier,
            cache: HashMap::new(),
        }
    }

    /// Reads the owner's profile; `Ok(None)` when none exists or the owner
    /// is not resolved yet.
    pub fn get(&mut self, owner: Option<&OwnerId>) -> BindingResult<Option<UserProfile>> {
        let Some(owner) = owner else {
            return Ok(None);
        };
        if let Some(cached) = self.cache.get(owner) {
            return Ok(cached.clone());
        }

        let result = self
            .store
            .get(owner, PROFILE_COLLECTION, &profile_id())
            .and_then(|document| {
                document
                    .map(UserProfile::from_document)
                    .transpose()
                    .map_err(|err| StoreError::InvalidData(err.to_string()))
            });

        match result {
            Ok(profile) => {
                self.cache.insert(owner.clone(), profile.clone());
                Ok(profile)
            }
            Err(source) => {
                warn!("event=profile_load module=binding status=error error={source}");
                self.notifier
                    .notify(outcome_message(false, Operation::Load, PROFILE_LABEL));
                Err(persistence(Operation::Load, source, PROFILE_LABEL))
            }
        }
    }

    /// Merges the `Some` fields of `patch` into the stored profile.
    pub fn update(&mut self, owner: Option<&OwnerId>, patch: &UserProfile) -> BindingResult<()> {
        let result = self.try_update(owner, patch);
        self.settle(PROFILE_LABEL, result)
    }

    /// Uploads an avatar image and stores its URL on the profile.
    ///
    /// # Errors
    /// - `InvalidInput` for empty payloads or non-`image/*` content types.
    /// - `PersistenceFailure` when either the upload or the profile write
    ///   fails.
    pub fn upload_profile_image(
        &mut self,
        owner: Option<&OwnerId>,
        bytes: &[u8],
        content_type: &str,
    ) -> BindingResult<String> {
        let result = self.try_upload(owner, bytes, content_type);
        self.settle(PROFILE_IMAGE_LABEL, result)
    }

    fn try_update(&mut self, owner: Option<&OwnerId>, patch: &UserProfile) -> BindingResult<()> {
        let owner = owner.ok_or(BindingError::AuthenticationRequired)?;
        let fields = patch.to_fields().map_err(BindingError::InvalidInput)?;
        self.write(owner, &fields, PROFILE_LABEL)?;
        self.patch_cache(owner, patch);
        Ok(())
    }

    fn try_upload(
        &mut self,
        owner: Option<&OwnerId>,
        bytes: &[u8],
        content_type: &str,
    ) -> BindingResult<String> {
        let owner = owner.ok_or(BindingError::AuthenticationRequired)?;
        let content_type = content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX)
            || content_type.len() == IMAGE_CONTENT_TYPE_PREFIX.len()
        {
            return Err(BindingError::InvalidInput(RecordError::InvalidContentType(
                content_type,
            )));
        }
        if bytes.is_empty() {
            return Err(BindingError::InvalidInput(RecordError::EmptyUpload));
        }

        let url = self
            .objects
            .upload(owner, bytes, &content_type)
            .map_err(|source| persistence(Operation::Update, source, PROFILE_IMAGE_LABEL))?;

        let mut fields = FieldMap::new();
        fields.insert(FIELD_PROFILE_IMAGE.to_string(), Value::String(url.clone()));
        if let Err(err) = self.write(owner, &fields, PROFILE_IMAGE_LABEL) {
            self.discard_object(&url);
            return Err(err);
        }
        self.patch_cache(
            owner,
            &UserProfile {
                profile_image: Some(url.clone()),
                ..UserProfile::default()
            },
        );
        Ok(url)
    }

    fn write(&self, owner: &OwnerId, fields: &FieldMap, label: &'static str) -> BindingResult<()> {
        self.store
            .merge(owner, PROFILE_COLLECTION, &profile_id(), fields)
            .map_err(|source| persistence(Operation::Update, source, label))
    }

    /// Drops an uploaded object that no profile field points at.
    fn discard_object(&self, url: &str) {
        match self.objects.delete(url) {
            Ok(()) => info!("event=object_delete module=binding status=ok reason=profile_write_failed"),
            Err(err) => warn!(
                "event=object_delete module=binding status=error reason=profile_write_failed error={err}"
            ),
        }
    }

    fn patch_cache(&mut self, owner: &OwnerId, patch: &UserProfile) {
        if let Some(cached) = self.cache.get_mut(owner) {
            cached.get_or_insert_with(UserProfile::default).merge(patch);
        }
    }

    fn settle<T>(&self, label: &'static str, result: BindingResult<T>) -> BindingResult<T> {
        let target = label.replace(' ', "_");
        match &result {
            Ok(_) => info!("event=profile_command module=binding status=ok target={target}"),
            Err(err) => warn!(
                "event=profile_command module=binding status=error target={} error_code={}",
                target,
                error_code(err)
            ),
        }
        self.notifier
            .notify(outcome_message(result.is_ok(), Operation::Update, label));
        result
    }
}

fn profile_id() -> RecordId {
    RecordId::new(PROFILE_DOCUMENT_ID)
}
