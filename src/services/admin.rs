use crate::{
    error::{AppError, AppResult},
    models::{claim, item, user, Claim, Item, User, UserModel},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;

pub struct AdminService {
    db: DatabaseConnection,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Dashboard counters.
    pub async fn get_stats(&self) -> AppResult<AdminStats> {
        let total_reports = Item::find().count(&self.db).await?;
        let pending_claims = Claim::find()
            .filter(claim::Column::Status.eq("pending"))
            .count(&self.db)
            .await?;
        let resolved_items = Item::find()
            .filter(item::Column::Status.eq("claimed"))
            .count(&self.db)
            .await?;
        let active_users = User::find()
            .filter(user::Column::Role.eq("user"))
            .count(&self.db)
            .await?;

        let today = chrono::Utc::now().naive_utc().date();
        let today_start = today.and_hms_opt(0, 0, 0).unwrap();

        let reports_today = Item::find()
            .filter(item::Column::CreatedAt.gte(today_start))
            .count(&self.db)
            .await?;

        Ok(AdminStats {
            total_reports,
            pending_claims,
            resolved_items,
            active_users,
            reports_today,
        })
    }

    pub async fn list_users(&self, page: u64, per_page: u64) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    pub async fn update_user_role(&self, user_id: i32, role: &str) -> AppResult<UserModel> {
        let valid_roles = ["user", "admin"];
        if !valid_roles.contains(&role) {
            return Err(AppError::Validation(format!(
                "Invalid role. Must be one of: {}",
                valid_roles.join(", ")
            )));
        }

        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();
        active.role = sea_orm::ActiveValue::Set(role.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a user account. Their items, claims and notifications go
    /// with them via foreign keys.
    pub async fn delete_user(&self, user_id: i32, acting_admin_id: i32) -> AppResult<()> {
        if user_id == acting_admin_id {
            return Err(AppError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        User::delete_by_id(user_id).exec(&self.db).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_reports: u64,
    pub pending_claims: u64,
    pub resolved_items: u64,
    pub active_users: u64,
    pub reports_today: u64,
}
