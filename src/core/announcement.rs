//! Announcement business logic - notices from the admin to every role.

use crate::{
    entities::{Announcement, announcement},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::info;

const WELCOME_TITLE: &str = "Welcome to Jessie Cane!";
const WELCOME_CONTENT: &str = "We're excited to have you here. Our team serves fresh sugarcane juice pressed to order. Check back here for new drinks, promos and store updates.";

/// Posts an announcement. Title and content are both required.
pub async fn post_announcement(
    db: &DatabaseConnection,
    title: &str,
    content: &str,
    image: Option<String>,
    author_id: Option<i64>,
) -> Result<announcement::Model> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(Error::validation(
            "Announcement title and content cannot be empty",
        ));
    }

    let posted = announcement::ActiveModel {
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        image: Set(image.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())),
        is_active: Set(true),
        author_id: Set(author_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Posted announcement {}: {}", posted.id, posted.title);
    Ok(posted)
}

/// Active announcements, newest first.
pub async fn get_active_announcements(db: &DatabaseConnection) -> Result<Vec<announcement::Model>> {
    Announcement::find()
        .filter(announcement::Column::IsActive.eq(true))
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Hides an announcement.
pub async fn delete_announcement(db: &DatabaseConnection, id: i64) -> Result<announcement::Model> {
    let existing = Announcement::find_by_id(id)
        .filter(announcement::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| Error::validation(format!("Announcement {id} not found")))?;

    let mut active: announcement::ActiveModel = existing.into();
    active.is_active = Set(false);
    let hidden = active.update(db).await?;

    info!("Removed announcement {}", hidden.id);
    Ok(hidden)
}

/// Posts the welcome announcement if there has never been one.
pub async fn seed_welcome_announcement(db: &DatabaseConnection) -> Result<bool> {
    if Announcement::find().count(db).await? > 0 {
        return Ok(false);
    }
    post_announcement(db, WELCOME_TITLE, WELCOME_CONTENT, None, None).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_post_requires_title_and_content() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = post_announcement(&db, "  ", "Body", None, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        let result = post_announcement(&db, "Title", "", None, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_newest_first_and_soft_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let first = post_announcement(&db, "Promo", "Buy one take one", None, None).await?;
        let second = post_announcement(
            &db,
            "New drink",
            "Try Mint Cane",
            Some("images/mint.png".to_string()),
            None,
        )
        .await?;

        let listed = get_active_announcements(&db).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[0].image.as_deref(), Some("images/mint.png"));

        delete_announcement(&db, first.id).await?;
        let listed = get_active_announcements(&db).await?;
        assert_eq!(listed.len(), 1);
        assert!(delete_announcement(&db, first.id).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_welcome_seeded_once() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(seed_welcome_announcement(&db).await?);
        assert!(!seed_welcome_announcement(&db).await?);

        let listed = get_active_announcements(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, WELCOME_TITLE);
        Ok(())
    }
}
