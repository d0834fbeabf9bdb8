// docguard-core/src/protection.rs
//! Interface to the external document-protection (DRM) service.
//!
//! Encryption and DRM wrapping are an external collaborator's concern; this
//! module specifies only the lifecycle the core relies on: `protect` creates
//! metadata and returns a document id, `verify` reads the current status,
//! and `revoke` is the only mutation. [`HttpProtectionClient`] talks to the
//! remote service; [`InMemoryProtectionStore`] implements the same contract
//! in-process and backs the test suite.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DocGuardError;

/// Status reported by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionStatus {
    Active,
    Revoked,
    Expired,
    NotFound,
}

/// Metadata kept per protected document. Created on protect, read on verify,
/// mutated only by revoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_id: Uuid,
    pub owner_id: String,
    pub creation_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// Stored state; `Expired` is derived at verify time, never stored.
    pub status: ProtectionStatus,
}

/// The protect/verify/revoke contract of the external DRM service.
#[async_trait]
pub trait ProtectionService: Send + Sync {
    /// Registers a document and returns its id.
    async fn protect(
        &self,
        owner_id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<Uuid, DocGuardError>;

    /// Reads the document's current status.
    async fn verify(&self, doc_id: Uuid) -> Result<ProtectionStatus, DocGuardError>;

    /// Revokes access. Only the owning id may revoke.
    async fn revoke(&self, doc_id: Uuid, owner_id: &str) -> Result<(), DocGuardError>;
}

#[derive(Serialize)]
struct ProtectRequest<'a> {
    owner_id: &'a str,
    expiry_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ProtectResponse {
    doc_id: Uuid,
}

#[derive(Deserialize)]
struct VerifyResponse {
    status: ProtectionStatus,
}

#[derive(Serialize)]
struct RevokeRequest<'a> {
    doc_id: Uuid,
    owner_id: &'a str,
}

/// Client for a remote protection service exposing `/protect`, `/verify`,
/// and `/revoke`.
pub struct HttpProtectionClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpProtectionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProtectionService for HttpProtectionClient {
    async fn protect(
        &self,
        owner_id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<Uuid, DocGuardError> {
        let response = self
            .http
            .post(format!("{}/protect", self.base_url))
            .json(&ProtectRequest {
                owner_id,
                expiry_date,
            })
            .send()
            .await
            .map_err(|e| DocGuardError::Protection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DocGuardError::Protection(format!(
                "protect failed with status {}",
                response.status()
            )));
        }

        let body: ProtectResponse = response
            .json()
            .await
            .map_err(|e| DocGuardError::Protection(e.to_string()))?;
        Ok(body.doc_id)
    }

    async fn verify(&self, doc_id: Uuid) -> Result<ProtectionStatus, DocGuardError> {
        let response = self
            .http
            .get(format!("{}/verify", self.base_url))
            .query(&[("doc_id", doc_id.to_string())])
            .send()
            .await
            .map_err(|e| DocGuardError::Protection(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(ProtectionStatus::NotFound);
        }
        if !response.status().is_success() {
            return Err(DocGuardError::Protection(format!(
                "verify failed with status {}",
                response.status()
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| DocGuardError::Protection(e.to_string()))?;
        Ok(body.status)
    }

    async fn revoke(&self, doc_id: Uuid, owner_id: &str) -> Result<(), DocGuardError> {
        let response = self
            .http
            .post(format!("{}/revoke", self.base_url))
            .json(&RevokeRequest { doc_id, owner_id })
            .send()
            .await
            .map_err(|e| DocGuardError::Protection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DocGuardError::Protection(format!(
                "revoke failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// In-process implementation of the protection contract.
#[derive(Default)]
pub struct InMemoryProtectionStore {
    documents: RwLock<HashMap<Uuid, DocumentMetadata>>,
}

impl InMemoryProtectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only metadata snapshot, for diagnostics.
    pub fn metadata(&self, doc_id: Uuid) -> Option<DocumentMetadata> {
        self.documents.read().ok()?.get(&doc_id).cloned()
    }
}

#[async_trait]
impl ProtectionService for InMemoryProtectionStore {
    async fn protect(
        &self,
        owner_id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<Uuid, DocGuardError> {
        let doc_id = Uuid::new_v4();
        let metadata = DocumentMetadata {
            doc_id,
            owner_id: owner_id.to_string(),
            creation_date: Utc::now(),
            expiry_date,
            status: ProtectionStatus::Active,
        };
        self.documents
            .write()
            .map_err(|_| DocGuardError::Protection("metadata store poisoned".to_string()))?
            .insert(doc_id, metadata);
        info!("protected document {doc_id} for owner");
        Ok(doc_id)
    }

    async fn verify(&self, doc_id: Uuid) -> Result<ProtectionStatus, DocGuardError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| DocGuardError::Protection("metadata store poisoned".to_string()))?;

        let Some(metadata) = documents.get(&doc_id) else {
            return Ok(ProtectionStatus::NotFound);
        };
        if metadata.status == ProtectionStatus::Revoked {
            return Ok(ProtectionStatus::Revoked);
        }
        if let Some(expiry) = metadata.expiry_date {
            if expiry <= Utc::now() {
                return Ok(ProtectionStatus::Expired);
            }
        }
        Ok(ProtectionStatus::Active)
    }

    async fn revoke(&self, doc_id: Uuid, owner_id: &str) -> Result<(), DocGuardError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| DocGuardError::Protection("metadata store poisoned".to_string()))?;

        let Some(metadata) = documents.get_mut(&doc_id) else {
            return Err(DocGuardError::Protection(format!(
                "unknown document {doc_id}"
            )));
        };
        if metadata.owner_id != owner_id {
            return Err(DocGuardError::Protection(
                "revoke denied: owner mismatch".to_string(),
            ));
        }
        metadata.status = ProtectionStatus::Revoked;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_protect_then_verify_is_active() {
        let store = InMemoryProtectionStore::new();
        let doc_id = store.protect("owner-1", None).await.unwrap();
        assert_eq!(store.verify(doc_id).await.unwrap(), ProtectionStatus::Active);
    }

    #[tokio::test]
    async fn test_expired_document_reports_expired() {
        let store = InMemoryProtectionStore::new();
        let past = Utc::now() - Duration::hours(1);
        let doc_id = store.protect("owner-1", Some(past)).await.unwrap();
        assert_eq!(
            store.verify(doc_id).await.unwrap(),
            ProtectionStatus::Expired
        );
    }

    #[tokio::test]
    async fn test_revoke_requires_matching_owner() {
        let store = InMemoryProtectionStore::new();
        let doc_id = store.protect("owner-1", None).await.unwrap();

        assert!(store.revoke(doc_id, "someone-else").await.is_err());
        assert_eq!(store.verify(doc_id).await.unwrap(), ProtectionStatus::Active);

        store.revoke(doc_id, "owner-1").await.unwrap();
        assert_eq!(
            store.verify(doc_id).await.unwrap(),
            ProtectionStatus::Revoked
        );
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let store = InMemoryProtectionStore::new();
        assert_eq!(
            store.verify(Uuid::new_v4()).await.unwrap(),
            ProtectionStatus::NotFound
        );
    }
}
