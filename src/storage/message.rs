//! Contact message storage.
//!
//! Redis key patterns:
//! - `message:{id}` - contact message (JSON)
//! - `messages` - SET of message ids
//! - `seq:message` - id sequence

use crate::models::{unix_now, ContactInput, ContactMessage};
use redis::AsyncCommands;

const INDEX_KEY: &str = "messages";
const KEY_PREFIX: &str = "message";
const SEQ_KEY: &str = "seq:message";

/// Store a new unread message stamped with the current time.
pub async fn create_message<C>(con: &mut C, input: ContactInput) -> Result<ContactMessage, redis::RedisError>
where
    C: AsyncCommands,
{
    let id = super::next_id(con, SEQ_KEY).await?;
    let message = ContactMessage {
        id,
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: crate::models::non_empty(input.phone),
        subject: input.subject.trim().to_string(),
        message: input.message.trim().to_string(),
        created_at: unix_now(),
        is_read: false,
    };
    super::insert_indexed(con, INDEX_KEY, KEY_PREFIX, id, &message).await?;
    Ok(message)
}

pub async fn get_message<C>(con: &mut C, id: u64) -> Result<Option<ContactMessage>, redis::RedisError>
where
    C: AsyncCommands,
{
    super::get_json(con, &format!("{}:{}", KEY_PREFIX, id)).await
}

/// Fetch a message and flag it as read. Returns `None` if the id is unknown.
pub async fn mark_read<C>(con: &mut C, id: u64) -> Result<Option<ContactMessage>, redis::RedisError>
where
    C: AsyncCommands,
{
    let Some(mut message) = get_message(con, id).await? else {
        return Ok(None);
    };
    if !message.is_read {
        message.is_read = true;
        if !super::replace_indexed(con, INDEX_KEY, KEY_PREFIX, id, &message).await? {
            return Ok(None);
        }
    }
    Ok(Some(message))
}

pub async fn delete_message<C>(con: &mut C, id: u64) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    super::delete_indexed(con, INDEX_KEY, KEY_PREFIX, id).await
}

/// Messages newest first.
pub async fn list_messages<C>(con: &mut C, unread_only: bool) -> Result<Vec<ContactMessage>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut messages: Vec<ContactMessage> = super::load_indexed(con, INDEX_KEY, KEY_PREFIX).await?;
    if unread_only {
        messages.retain(|m| !m.is_read);
    }
    messages.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    Ok(messages)
}
