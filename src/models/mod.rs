pub mod claim;
pub mod conversation;
pub mod item;
pub mod message;
pub mod notification;
pub mod refresh_token;
pub mod user;

pub use claim::{Entity as Claim, Model as ClaimModel};
pub use conversation::{Entity as Conversation, Model as ConversationModel};
pub use item::{Entity as Item, Model as ItemModel};
pub use message::{Entity as Message, Model as MessageModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
pub use refresh_token::Entity as RefreshToken;
pub use user::{Entity as User, Model as UserModel};
