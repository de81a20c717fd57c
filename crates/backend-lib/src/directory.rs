// ============================
// crates/backend-lib/src/directory.rs
// ============================
//! Member directory abstraction with flat-file and in-memory implementations.
//!
//! The directory is read-only from this crate's point of view: members are
//! created and approved by an administration process elsewhere.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::fs as tokio_fs;

use crate::error::AppError;

/// Approval state of a member account
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Pending,
    Approved,
    Rejected,
    /// Any value this build does not know about. Never approved.
    #[serde(other)]
    Unknown,
}

/// A member record as stored in the directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Unique lookup key
    pub email: String,
    /// bcrypt hash, or a legacy plaintext value
    #[serde(default)]
    pub password: Option<String>,
    pub access_status: AccessStatus,
    /// Role shown to the application
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// The fields a session refresh needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub id: String,
    pub position: String,
    pub avatar_url: Option<String>,
}

impl From<Member> for MemberProfile {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            position: member.position,
            avatar_url: member.avatar_url,
        }
    }
}

/// Trait for member directory backends
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Find a member by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AppError>;

    /// Find the refreshable profile fields of a member by exact email
    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<MemberProfile>, AppError> {
        Ok(self.find_by_email(email).await?.map(MemberProfile::from))
    }
}

/// Flat-file implementation of the `MemberDirectory` trait.
///
/// The file holds a JSON array of members and is read on every lookup, so
/// edits made by the administration side show up without a restart.
#[derive(Debug, Clone)]
pub struct FlatFileDirectory {
    path: PathBuf,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            anyhow::bail!("member directory file {} does not exist", path.display());
        }
        Ok(Self { path })
    }

    async fn read_members(&self) -> Result<Vec<Member>, AppError> {
        let content = tokio_fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Directory(format!("failed to read {}: {e}", self.path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::Directory(format!("failed to parse {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl MemberDirectory for FlatFileDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AppError> {
        let members = self.read_members().await?;
        Ok(members.into_iter().find(|m| m.email == email))
    }
}

/// In-memory directory keyed by email.
///
/// Counts lookups so callers can check how often the directory was hit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    members: Arc<DashMap<String, Member>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members<I: IntoIterator<Item = Member>>(members: I) -> Self {
        let directory = Self::new();
        for member in members {
            directory.insert(member);
        }
        directory
    }

    /// Insert or replace a member
    pub fn insert(&self, member: Member) {
        self.members.insert(member.email.clone(), member);
    }

    /// Remove a member, returning it if present
    pub fn remove(&self, email: &str) -> Option<Member> {
        self.members.remove(email).map(|(_, member)| member)
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.members.get(email).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn member(email: &str) -> Member {
        Member {
            id: "m-1".to_string(),
            name: "Ana".to_string(),
            email: email.to_string(),
            password: Some("plain1".to_string()),
            access_status: AccessStatus::Approved,
            position: "editor".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_member_json_shape() {
        let raw = r#"{
            "id": "7",
            "name": "Bea",
            "email": "bea@example.com",
            "accessStatus": "pending",
            "position": "writer",
            "avatarUrl": "http://x/b.png"
        }"#;
        let member: Member = serde_json::from_str(raw).unwrap();
        assert_eq!(member.access_status, AccessStatus::Pending);
        assert_eq!(member.password, None);
        assert_eq!(member.avatar_url.as_deref(), Some("http://x/b.png"));
    }

    #[test]
    fn test_unknown_access_status_is_not_approved() {
        let status: AccessStatus = serde_json::from_str(r#""suspended""#).unwrap();
        assert_eq!(status, AccessStatus::Unknown);
        assert_ne!(status, AccessStatus::Approved);
    }

    #[tokio::test]
    async fn test_flat_file_lookup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("members.json");
        let members = vec![member("ana@example.com")];
        std::fs::write(&path, serde_json::to_string(&members).unwrap()).unwrap();

        let directory = FlatFileDirectory::new(&path).unwrap();
        let found = directory.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(found, Some(members[0].clone()));

        // Lookup is exact
        assert!(directory
            .find_by_email("ANA@example.com")
            .await
            .unwrap()
            .is_none());

        let profile = directory
            .find_profile_by_email("ana@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.position, "editor");
    }

    #[tokio::test]
    async fn test_flat_file_sees_edits_without_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("members.json");
        std::fs::write(&path, "[]").unwrap();

        let directory = FlatFileDirectory::new(&path).unwrap();
        assert!(directory.find_by_email("ana@example.com").await.unwrap().is_none());

        let members = vec![member("ana@example.com")];
        std::fs::write(&path, serde_json::to_string(&members).unwrap()).unwrap();
        assert!(directory.find_by_email("ana@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_flat_file_errors() {
        let dir = tempdir().unwrap();
        assert!(FlatFileDirectory::new(dir.path().join("absent.json")).is_err());

        let path = dir.path().join("members.json");
        std::fs::write(&path, "not json").unwrap();
        let directory = FlatFileDirectory::new(&path).unwrap();
        let err = directory.find_by_email("a@b.c").await.unwrap_err();
        assert!(matches!(err, AppError::Directory(_)));
    }

    #[tokio::test]
    async fn test_in_memory_counts_lookups() {
        let directory = InMemoryDirectory::with_members([member("ana@example.com")]);
        assert_eq!(directory.lookups(), 0);

        assert!(directory.find_by_email("ana@example.com").await.unwrap().is_some());
        assert!(directory.find_profile_by_email("nobody@example.com").await.unwrap().is_none());
        assert_eq!(directory.lookups(), 2);

        assert!(directory.remove("ana@example.com").is_some());
        assert!(directory.find_by_email("ana@example.com").await.unwrap().is_none());
    }
}
