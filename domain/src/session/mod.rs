//! Session domain.
//!
//! - [`entities::Session`]: one conversation and its ordered turns
//! - [`turn::Turn`]: an immutable record of one user turn
//! - [`message::ConversationContext`]: history handed to model providers
//! - [`reply::ModelReply`]: tool request or draft returned by a provider

pub mod entities;
pub mod id;
pub mod message;
pub mod reply;
pub mod turn;

pub use entities::Session;
pub use id::SessionId;
pub use message::{ConversationContext, Message, Role};
pub use reply::ModelReply;
pub use turn::{Turn, TurnBuilder};
