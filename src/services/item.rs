use crate::{
    error::{AppError, AppResult},
    models::{item, ItemModel, Item, User},
    utils::generate_ref_no,
};
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::Serialize;
use utoipa::ToSchema;

pub const ITEM_KINDS: &[&str] = &["lost", "found"];
pub const ITEM_STATUSES: &[&str] = &["pending", "claimed"];

/// An item together with its reporter's display name.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithReporter {
    #[serde(flatten)]
    pub item: ItemModel,
    pub reporter_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub kind: String,
    pub location: String,
    pub date_incident: chrono::NaiveDate,
    pub contact_info: String,
    pub security_question: String,
    pub image_url: Option<String>,
}

pub struct ItemService {
    db: DatabaseConnection,
}

impl ItemService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Report a lost or found item. Assigns a reference number and
    /// notifies the reporter.
    pub async fn create(&self, user_id: i32, input: NewItem) -> AppResult<ItemModel> {
        validate_item_name(&input.name)?;

        if !ITEM_KINDS.contains(&input.kind.as_str()) {
            return Err(AppError::Validation(
                "kind must be 'lost' or 'found'".to_string(),
            ));
        }

        let item_count = Item::find().count(&self.db).await?;
        let ref_no = generate_ref_no(&input.location, item_count);
        let now = chrono::Utc::now().naive_utc();

        let new_item = item::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            name: sea_orm::ActiveValue::Set(input.name),
            description: sea_orm::ActiveValue::Set(input.description),
            category: sea_orm::ActiveValue::Set(input.category),
            kind: sea_orm::ActiveValue::Set(input.kind),
            location: sea_orm::ActiveValue::Set(input.location),
            date_incident: sea_orm::ActiveValue::Set(input.date_incident),
            contact_info: sea_orm::ActiveValue::Set(input.contact_info),
            security_question: sea_orm::ActiveValue::Set(input.security_question),
            image_url: sea_orm::ActiveValue::Set(input.image_url),
            status: sea_orm::ActiveValue::Set("pending".to_string()),
            ref_no: sea_orm::ActiveValue::Set(ref_no),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = new_item.insert(&self.db).await?;

        // Confirmation notification (non-fatal if it fails, but keep the error
        // visible: this is a plain insert and should not fail in practice).
        super::notification::insert_notification(
            &self.db,
            user_id,
            "Report Submitted",
            &format!(
                "Your {} item report '{}' has been submitted. Reference number: {}.",
                saved.kind, saved.name, saved.ref_no
            ),
            "report",
        )
        .await?;

        Ok(saved)
    }

    /// Public listing with optional filters and free-text search.
    pub async fn list_public(
        &self,
        filter: &ItemFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ItemWithReporter>, u64)> {
        let mut query = Item::find().find_also_related(User);

        if let Some(category) = &filter.category {
            query = query.filter(item::Column::Category.eq(category.clone()));
        }
        if let Some(kind) = &filter.kind {
            query = query.filter(item::Column::Kind.eq(kind.clone()));
        }
        if let Some(status) = &filter.status {
            query = query.filter(item::Column::Status.eq(status.clone()));
        }
        if let Some(location) = &filter.location {
            let pattern = format!("%{}%", escape_like(location));
            query = query
                .filter(Expr::col((item::Entity, item::Column::Location)).ilike(pattern));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(
                Condition::any()
                    .add(Expr::col((item::Entity, item::Column::Name)).ilike(pattern.clone()))
                    .add(
                        Expr::col((item::Entity, item::Column::Description))
                            .ilike(pattern.clone()),
                    )
                    .add(Expr::col((item::Entity, item::Column::Location)).ilike(pattern)),
            );
        }

        let paginator = query
            .order_by_desc(item::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let items = rows
            .into_iter()
            .map(|(item, reporter)| ItemWithReporter {
                item,
                reporter_name: reporter.map(|u| u.name),
            })
            .collect();

        Ok((items, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemWithReporter> {
        let (item, reporter) = Item::find_by_id(id)
            .find_also_related(User)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(ItemWithReporter {
            item,
            reporter_name: reporter.map(|u| u.name),
        })
    }

    pub async fn get_model(&self, id: i32) -> AppResult<ItemModel> {
        Item::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Items reported by the given user.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ItemModel>, u64)> {
        let paginator = Item::find()
            .filter(item::Column::UserId.eq(user_id))
            .order_by_desc(item::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Delete an item. Only the reporter or an admin may do this.
    pub async fn delete(&self, id: i32, user_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = self.get_model(id).await?;
        if existing.user_id != user_id && !is_admin {
            return Err(AppError::Forbidden);
        }
        Item::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

/// Item names must carry at least one letter so reports like "???" or
/// "123" are rejected up front.
pub fn validate_item_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(AppError::Validation(
            "Item name must be at least 2 characters".to_string(),
        ));
    }
    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return Err(AppError::Validation(
            "Item name must contain at least one letter".to_string(),
        ));
    }
    Ok(())
}

fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
