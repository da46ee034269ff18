use crate::{
    error::{AppError, AppResult},
    models::{conversation, message, user, Conversation, ConversationModel, Message, MessageModel, User},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// A thread together with the other side's display name.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationWithCounterpart {
    #[serde(flatten)]
    pub conversation: ConversationModel,
    pub counterpart_name: Option<String>,
}

pub struct ConversationService {
    db: DatabaseConnection,
}

impl ConversationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get the user's support conversation, creating it on first use.
    /// Threads are user <-> admin; the first registered admin takes
    /// new conversations.
    pub async fn get_or_create(&self, user_id: i32) -> AppResult<ConversationModel> {
        if let Some(existing) = Conversation::find()
            .filter(conversation::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        {
            return Ok(existing);
        }

        let admin = User::find()
            .filter(user::Column::Role.eq("admin"))
            .order_by_asc(user::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::Validation("No administrator is available".to_string())
            })?;

        if admin.id == user_id {
            return Err(AppError::Validation(
                "Admins answer conversations, they don't open them".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let model = conversation::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            admin_id: sea_orm::ActiveValue::Set(admin.id),
            last_message: sea_orm::ActiveValue::Set("Conversation started".to_string()),
            last_message_at: sea_orm::ActiveValue::Set(now),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(created) => Ok(created),
            // A concurrent first call can win the unique-index race on
            // user_id; the thread it created is the one we want.
            Err(insert_err) => Conversation::find()
                .filter(conversation::Column::UserId.eq(user_id))
                .one(&self.db)
                .await?
                .ok_or(AppError::Database(insert_err)),
        }
    }

    /// Conversations visible to the requester: admins see the threads
    /// assigned to them, users see their own.
    pub async fn list(
        &self,
        requester_id: i32,
        is_admin: bool,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ConversationWithCounterpart>, u64)> {
        let mut query = Conversation::find();
        if is_admin {
            query = query.filter(conversation::Column::AdminId.eq(requester_id));
        } else {
            query = query.filter(conversation::Column::UserId.eq(requester_id));
        }

        let paginator = query
            .order_by_desc(conversation::Column::LastMessageAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let conversations = paginator.fetch_page(page.saturating_sub(1)).await?;

        let counterpart_ids: Vec<i32> = conversations
            .iter()
            .map(|c| if is_admin { c.user_id } else { c.admin_id })
            .collect();
        let names: HashMap<i32, String> = User::find()
            .filter(user::Column::Id.is_in(counterpart_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let items = conversations
            .into_iter()
            .map(|c| {
                let counterpart_id = if is_admin { c.user_id } else { c.admin_id };
                ConversationWithCounterpart {
                    counterpart_name: names.get(&counterpart_id).cloned(),
                    conversation: c,
                }
            })
            .collect();
        Ok((items, total))
    }

    /// Messages in a conversation, oldest first.
    pub async fn messages(
        &self,
        conversation_id: i32,
        requester_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<MessageModel>, u64)> {
        self.require_participant(conversation_id, requester_id)
            .await?;

        let paginator = Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let messages = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((messages, total))
    }

    /// Append a message and bump the thread preview in one transaction.
    pub async fn send(
        &self,
        conversation_id: i32,
        sender_id: i32,
        content: &str,
    ) -> AppResult<MessageModel> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let conversation = self
            .require_participant(conversation_id, sender_id)
            .await?;

        let now = chrono::Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let model = message::ActiveModel {
            conversation_id: sea_orm::ActiveValue::Set(conversation_id),
            sender_id: sea_orm::ActiveValue::Set(sender_id),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let saved = model.insert(&txn).await?;

        let mut active: conversation::ActiveModel = conversation.into();
        active.last_message = sea_orm::ActiveValue::Set(content.to_string());
        active.last_message_at = sea_orm::ActiveValue::Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(saved)
    }

    async fn require_participant(
        &self,
        conversation_id: i32,
        requester_id: i32,
    ) -> AppResult<ConversationModel> {
        let conversation = Conversation::find_by_id(conversation_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if conversation.user_id != requester_id && conversation.admin_id != requester_id {
            return Err(AppError::Forbidden);
        }

        Ok(conversation)
    }
}
