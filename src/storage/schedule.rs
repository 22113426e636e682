//! Weekly schedule storage.
//!
//! Redis key patterns:
//! - `schedule:{id}` - schedule entry (JSON)
//! - `schedules` - SET of entry ids
//! - `seq:schedule` - id sequence

use crate::models::{ScheduleEntry, ScheduleInput};
use redis::AsyncCommands;

const INDEX_KEY: &str = "schedules";
const KEY_PREFIX: &str = "schedule";
const SEQ_KEY: &str = "seq:schedule";

pub async fn create_entry<C>(con: &mut C, input: ScheduleInput) -> Result<ScheduleEntry, redis::RedisError>
where
    C: AsyncCommands,
{
    let id = super::next_id(con, SEQ_KEY).await?;
    let entry = input.into_entry(id);
    super::insert_indexed(con, INDEX_KEY, KEY_PREFIX, id, &entry).await?;
    Ok(entry)
}

pub async fn get_entry<C>(con: &mut C, id: u64) -> Result<Option<ScheduleEntry>, redis::RedisError>
where
    C: AsyncCommands,
{
    super::get_json(con, &format!("{}:{}", KEY_PREFIX, id)).await
}

/// Replace an entry. Returns `None` if the id is unknown.
pub async fn update_entry<C>(
    con: &mut C,
    id: u64,
    input: ScheduleInput,
) -> Result<Option<ScheduleEntry>, redis::RedisError>
where
    C: AsyncCommands,
{
    let entry = input.into_entry(id);
    if !super::replace_indexed(con, INDEX_KEY, KEY_PREFIX, id, &entry).await? {
        return Ok(None);
    }
    Ok(Some(entry))
}

pub async fn delete_entry<C>(con: &mut C, id: u64) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    super::delete_indexed(con, INDEX_KEY, KEY_PREFIX, id).await
}

/// Entries ordered by (day_of_week, start_time, id). Entries without a start
/// time sort first within their day.
pub async fn list_entries<C>(con: &mut C, active_only: bool) -> Result<Vec<ScheduleEntry>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut entries: Vec<ScheduleEntry> = super::load_indexed(con, INDEX_KEY, KEY_PREFIX).await?;
    if active_only {
        entries.retain(|e| e.is_active);
    }
    entries.sort_by(|a, b| {
        (a.day_of_week, &a.start_time, a.id).cmp(&(b.day_of_week, &b.start_time, b.id))
    });
    Ok(entries)
}

pub async fn count_entries<C>(con: &mut C) -> Result<usize, redis::RedisError>
where
    C: AsyncCommands,
{
    con.scard(INDEX_KEY).await
}
