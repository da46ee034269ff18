use crate::{
    error::{AppError, AppResult},
    models::{claim, item, Claim, ClaimModel, Item, User},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// A claim joined with the data an admin needs to adjudicate it.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimWithDetails {
    #[serde(flatten)]
    pub claim: ClaimModel,
    pub item_name: String,
    pub item_ref_no: String,
    pub security_question: String,
    pub claimant_name: String,
    pub claimant_email: String,
}

pub struct ClaimService {
    db: DatabaseConnection,
}

impl ClaimService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submit an ownership claim for an item.
    ///
    /// Preconditions are enforced here, not in the client: the item must
    /// still be unclaimed, the claimant must not be the reporter, and a
    /// user gets at most one pending claim per item (a partial unique
    /// index backs the latter against races).
    pub async fn submit(
        &self,
        item_id: i32,
        user_id: i32,
        security_answer: &str,
    ) -> AppResult<ClaimModel> {
        let item = Item::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if item.user_id == user_id {
            return Err(AppError::Validation(
                "You cannot claim an item you reported".to_string(),
            ));
        }

        if item.status != "pending" {
            return Err(AppError::Conflict(
                "This item has already been claimed".to_string(),
            ));
        }

        let answer = security_answer.trim();
        if answer.is_empty() {
            return Err(AppError::Validation(
                "Security answer must not be empty".to_string(),
            ));
        }

        let existing = Claim::find()
            .filter(claim::Column::ItemId.eq(item_id))
            .filter(claim::Column::UserId.eq(user_id))
            .filter(claim::Column::Status.eq("pending"))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict(
                "You already have a pending claim on this item".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let model = claim::ActiveModel {
            item_id: sea_orm::ActiveValue::Set(item_id),
            user_id: sea_orm::ActiveValue::Set(user_id),
            security_answer: sea_orm::ActiveValue::Set(answer.to_string()),
            status: sea_orm::ActiveValue::Set("pending".to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;

        super::notification::insert_notification(
            &self.db,
            user_id,
            "Claim Submitted",
            &format!(
                "Your claim for '{}' ({}) has been submitted and is awaiting review.",
                item.name, item.ref_no
            ),
            "claim",
        )
        .await?;

        Ok(saved)
    }

    /// Claims submitted by the given user.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ClaimWithDetails>, u64)> {
        let paginator = Claim::find()
            .filter(claim::Column::UserId.eq(user_id))
            .order_by_desc(claim::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let claims = paginator.fetch_page(page.saturating_sub(1)).await?;
        let detailed = self.attach_details(claims).await?;
        Ok((detailed, total))
    }

    /// Admin listing, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ClaimWithDetails>, u64)> {
        let mut query = Claim::find();
        if let Some(s) = status {
            query = query.filter(claim::Column::Status.eq(s));
        }

        let paginator = query
            .order_by_desc(claim::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let claims = paginator.fetch_page(page.saturating_sub(1)).await?;
        let detailed = self.attach_details(claims).await?;
        Ok((detailed, total))
    }

    /// Approve a claim.
    ///
    /// Runs in a single transaction: the claim becomes approved, the item
    /// becomes claimed, every other pending claim on the item is
    /// auto-rejected, and the claimant is notified. Either all of it
    /// happens or none of it does.
    pub async fn approve(&self, claim_id: i32, admin_id: i32) -> AppResult<ClaimModel> {
        let txn = self.db.begin().await?;

        let existing = Claim::find_by_id(claim_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.status != "pending" {
            return Err(AppError::Validation(
                "Claim is already resolved".to_string(),
            ));
        }

        let item = Item::find_by_id(existing.item_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if item.status != "pending" {
            return Err(AppError::Conflict(
                "Item has already been claimed".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let claimant_id = existing.user_id;
        let item_id = existing.item_id;
        let item_name = item.name.clone();
        let item_ref_no = item.ref_no.clone();

        let mut active: claim::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set("approved".to_string());
        active.resolved_by = sea_orm::ActiveValue::Set(Some(admin_id));
        active.resolved_at = sea_orm::ActiveValue::Set(Some(now));
        let approved = active.update(&txn).await?;

        // Losing claims are closed out in the same transaction.
        use sea_orm::sea_query::Expr;
        Claim::update_many()
            .col_expr(claim::Column::Status, Expr::value("rejected"))
            .col_expr(claim::Column::ResolvedBy, Expr::value(Some(admin_id)))
            .col_expr(claim::Column::ResolvedAt, Expr::value(Some(now)))
            .filter(claim::Column::ItemId.eq(item_id))
            .filter(claim::Column::Status.eq("pending"))
            .filter(claim::Column::Id.ne(claim_id))
            .exec(&txn)
            .await?;

        let mut item_active: item::ActiveModel = item.into();
        item_active.status = sea_orm::ActiveValue::Set("claimed".to_string());
        item_active.updated_at = sea_orm::ActiveValue::Set(now);
        item_active.update(&txn).await?;

        super::notification::insert_notification(
            &txn,
            claimant_id,
            "Claim Approved",
            &format!(
                "Your claim for '{}' ({}) has been approved. Check the item's contact details to arrange pickup.",
                item_name, item_ref_no
            ),
            "claim",
        )
        .await?;

        txn.commit().await?;
        Ok(approved)
    }

    /// Reject a claim and notify the claimant.
    pub async fn reject(&self, claim_id: i32, admin_id: i32) -> AppResult<ClaimModel> {
        let txn = self.db.begin().await?;

        let existing = Claim::find_by_id(claim_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.status != "pending" {
            return Err(AppError::Validation(
                "Claim is already resolved".to_string(),
            ));
        }

        let item = Item::find_by_id(existing.item_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let claimant_id = existing.user_id;

        let mut active: claim::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set("rejected".to_string());
        active.resolved_by = sea_orm::ActiveValue::Set(Some(admin_id));
        active.resolved_at = sea_orm::ActiveValue::Set(Some(now));
        let rejected = active.update(&txn).await?;

        super::notification::insert_notification(
            &txn,
            claimant_id,
            "Claim Rejected",
            &format!(
                "Your claim for '{}' ({}) has been rejected.",
                item.name, item.ref_no
            ),
            "claim",
        )
        .await?;

        txn.commit().await?;
        Ok(rejected)
    }

    async fn attach_details(&self, claims: Vec<ClaimModel>) -> AppResult<Vec<ClaimWithDetails>> {
        let item_ids: Vec<i32> = claims.iter().map(|c| c.item_id).collect();
        let user_ids: Vec<i32> = claims.iter().map(|c| c.user_id).collect();

        let items: HashMap<i32, crate::models::ItemModel> = Item::find()
            .filter(item::Column::Id.is_in(item_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let users: HashMap<i32, crate::models::UserModel> = User::find()
            .filter(crate::models::user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(claims
            .into_iter()
            .map(|claim| {
                let item = items.get(&claim.item_id);
                let user = users.get(&claim.user_id);
                ClaimWithDetails {
                    item_name: item.map(|i| i.name.clone()).unwrap_or_default(),
                    item_ref_no: item.map(|i| i.ref_no.clone()).unwrap_or_default(),
                    security_question: item
                        .map(|i| i.security_question.clone())
                        .unwrap_or_default(),
                    claimant_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    claimant_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    claim,
                }
            })
            .collect())
    }
}
