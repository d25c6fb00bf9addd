use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flightbook_orm::{Database, FromAnyRow, Model, Pagination, QueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::{Any, Executor};

use super::non_empty;
use crate::Error;

/// A note written by a user, optionally with an image from the upload folder.
#[derive(Debug, Clone, Model, FromAnyRow)]
#[orm(table = "posts")]
pub struct Post {
    #[orm(primary_key, auto_increment)]
    id: Option<i64>,
    note: String,
    /// Filename relative to the upload folder.
    image: Option<String>,
    #[orm(foreign_key = "users::id", on_delete = "cascade", index)]
    user_id: i64,
}

/// Serializable view of a `Post`, with the image inlined as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: Option<i64>,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub note: String,
    pub image: Option<String>,
    pub base64: String,
}

impl Post {
    pub fn new(user_id: i64, note: &str, image: Option<&str>) -> Self {
        Self { id: None, note: note.to_string(), image: image.map(str::to_string), user_id }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn snapshot(&self, base64: String) -> PostSnapshot {
        PostSnapshot {
            id: self.id,
            user_id: self.user_id,
            note: self.note.clone(),
            image: self.image.clone(),
            base64,
        }
    }

    /// Inserts the post and returns it with its generated id.
    ///
    /// Fails with a constraint violation when the owner does not exist.
    pub async fn create(self, db: &Database) -> Result<Self, Error> {
        self.create_with(db.model::<Post>()).await
    }

    /// Inserts through `query`, which may run on a transaction.
    pub async fn create_with<'a, E>(mut self, query: QueryBuilder<'a, Post, E>) -> Result<Self, Error>
    where
        E: Executor<'a, Database = Any>,
    {
        self.id = query.insert(&self).await?;
        Ok(self)
    }

    /// The snapshot, reading the image from `upload_dir`.
    ///
    /// A post without an image has an empty `base64`. A missing or unreadable
    /// file is returned as `Error::Io`.
    pub async fn read(&self, upload_dir: &Path) -> Result<PostSnapshot, Error> {
        let base64 = match &self.image {
            Some(image) => {
                let bytes = tokio::fs::read(upload_dir.join(image)).await?;
                STANDARD.encode(bytes)
            }
            None => String::new(),
        };
        Ok(self.snapshot(base64))
    }

    /// Overwrites the fields given non-empty values, then saves the row.
    pub async fn update(&mut self, db: &Database, note: &str, image: &str) -> Result<&mut Self, Error> {
        if let Some(note) = non_empty(note) {
            self.note = note.to_string();
        }
        if let Some(image) = non_empty(image) {
            self.image = Some(image.to_string());
        }
        db.model::<Post>().save(self).await?;
        Ok(self)
    }

    pub async fn delete(self, db: &Database) -> Result<(), Error> {
        let id = self.id.ok_or_else(|| flightbook_orm::Error::invalid_argument("post was never saved"))?;
        match db.model::<Post>().equals(post_fields::ID, id).delete().await? {
            0 => Err(flightbook_orm::Error::NotFound.into()),
            _ => Ok(()),
        }
    }

    pub async fn find(db: &Database, id: i64) -> Result<Option<Self>, Error> {
        Ok(db.model::<Post>().equals(post_fields::ID, id).first_or_none().await?)
    }

    /// Posts of one user ordered by id; one page of them when `page` is given.
    pub async fn for_user(db: &Database, user_id: i64, page: Option<Pagination>) -> Result<Vec<Self>, Error> {
        let query = db.model::<Post>().equals(post_fields::USER_ID, user_id).order_by(post_fields::ID, true);
        let query = match page {
            Some(page) => page.apply(query),
            None => query,
        };
        Ok(query.scan().await?)
    }
}

/// Renders the snapshot as JSON without touching the disk (`base64` is empty).
impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.snapshot(String::new())).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inlines_image_as_base64() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"\x89PNG").unwrap();

        let snapshot = Post::new(7, "hello", Some("logo.png")).read(dir.path()).await.unwrap();
        assert_eq!(snapshot.user_id, 7);
        assert_eq!(snapshot.base64, "iVBORw==");
    }

    #[tokio::test]
    async fn missing_image_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Post::new(7, "hello", Some("gone.png")).read(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn no_image_means_empty_base64() {
        let snapshot = Post::new(7, "hello", None).read(Path::new("/nonexistent")).await.unwrap();
        assert_eq!(snapshot.base64, "");
        assert_eq!(snapshot.image, None);
    }

    #[test]
    fn serializes_owner_as_user_id() {
        let value: serde_json::Value = serde_json::from_str(&Post::new(3, "n", None).to_string()).unwrap();
        assert_eq!(value["userID"], 3);
    }
}
