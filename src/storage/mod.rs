//! Redis storage layer for administrators, products, schedule, site content
//! and contact messages.
//!
//! All functions are async and generic over `redis::AsyncCommands`.
//! Records are serialized to JSON. Collections use an `INCR` sequence for ids
//! and a SET indexing the live ids.

pub mod admin;
pub mod message;
pub mod product;
pub mod schedule;
pub mod site;

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

fn json_error(what: &'static str, err: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::UnexpectedReturnType,
        what,
        err.to_string(),
    ))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, redis::RedisError> {
    serde_json::to_string(value).map_err(|e| json_error("JSON serialize", e))
}

pub(crate) fn from_json<T: DeserializeOwned>(data: &str) -> Result<T, redis::RedisError> {
    serde_json::from_str(data).map_err(|e| json_error("JSON deserialize", e))
}

/// Read and decode a JSON value.
pub(crate) async fn get_json<C, T>(con: &mut C, key: &str) -> Result<Option<T>, redis::RedisError>
where
    C: AsyncCommands,
    T: DeserializeOwned,
{
    let json: Option<String> = con.get(key).await?;
    json.as_deref().map(from_json).transpose()
}

/// Encode and store a JSON value without expiry.
pub(crate) async fn set_json<C, T>(con: &mut C, key: &str, value: &T) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
    T: Serialize,
{
    let json = to_json(value)?;
    con.set::<_, _, ()>(key, json).await
}

/// Allocate the next id of a collection (starts at 1).
pub(crate) async fn next_id<C>(con: &mut C, seq_key: &str) -> Result<u64, redis::RedisError>
where
    C: AsyncCommands,
{
    con.incr(seq_key, 1u64).await
}

/// Load every record of an indexed collection.
///
/// Ids present in the index but missing their record are skipped.
pub(crate) async fn load_indexed<C, T>(
    con: &mut C,
    index_key: &str,
    key_prefix: &str,
) -> Result<Vec<T>, redis::RedisError>
where
    C: AsyncCommands,
    T: DeserializeOwned,
{
    let ids: Vec<u64> = con.smembers(index_key).await?;
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = get_json(con, &format!("{}:{}", key_prefix, id)).await? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Store a new record and add its id to the index in one step.
pub(crate) async fn insert_indexed<C, T>(
    con: &mut C,
    index_key: &str,
    key_prefix: &str,
    id: u64,
    value: &T,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
    T: Serialize,
{
    let json = to_json(value)?;
    let script = redis::Script::new(
        r#"
        redis.call('SET', KEYS[1], ARGV[1])
        redis.call('SADD', KEYS[2], ARGV[2])
        return 1
        "#,
    );
    let (): () = script
        .key(format!("{}:{}", key_prefix, id))
        .key(index_key)
        .arg(json)
        .arg(id)
        .invoke_async(con)
        .await?;
    Ok(())
}

/// Overwrite a record only while its id is still indexed.
///
/// Returns false when the id is not in the index, in which case nothing is
/// written. A concurrent delete therefore cannot leave an unindexed record.
pub(crate) async fn replace_indexed<C, T>(
    con: &mut C,
    index_key: &str,
    key_prefix: &str,
    id: u64,
    value: &T,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
    T: Serialize,
{
    let json = to_json(value)?;
    let script = redis::Script::new(
        r#"
        if redis.call('SISMEMBER', KEYS[2], ARGV[2]) == 0 then
            return 0
        end
        redis.call('SET', KEYS[1], ARGV[1])
        return 1
        "#,
    );
    let written: i32 = script
        .key(format!("{}:{}", key_prefix, id))
        .key(index_key)
        .arg(json)
        .arg(id)
        .invoke_async(con)
        .await?;
    Ok(written == 1)
}

/// Remove a record and its index entry. Returns false if it did not exist.
pub(crate) async fn delete_indexed<C>(
    con: &mut C,
    index_key: &str,
    key_prefix: &str,
    id: u64,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let script = redis::Script::new(
        r#"
        redis.call('SREM', KEYS[2], ARGV[1])
        return redis.call('DEL', KEYS[1])
        "#,
    );
    let deleted: i32 = script
        .key(format!("{}:{}", key_prefix, id))
        .key(index_key)
        .arg(id)
        .invoke_async(con)
        .await?;
    Ok(deleted > 0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Item {
        id: u64,
        label: String,
    }

    fn item(id: u64, label: &str) -> Item {
        Item {
            id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_replace_skips_unindexed_record() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        // A record whose index entry is already gone, as after a delete.
        set_json(&mut con, "item:1", &item(1, "old")).await.unwrap();

        let written = replace_indexed(&mut con, "items", "item", 1, &item(1, "new"))
            .await
            .unwrap();
        assert!(!written);
        let stored: Option<Item> = get_json(&mut con, "item:1").await.unwrap();
        assert_eq!(stored, Some(item(1, "old")));
    }

    #[tokio::test]
    async fn test_replace_after_delete_leaves_no_record() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        insert_indexed(&mut con, "items", "item", 1, &item(1, "a")).await.unwrap();
        assert!(delete_indexed(&mut con, "items", "item", 1).await.unwrap());
        assert!(!replace_indexed(&mut con, "items", "item", 1, &item(1, "b"))
            .await
            .unwrap());

        let exists: bool = con.exists("item:1").await.unwrap();
        assert!(!exists);
        let listed: Vec<Item> = load_indexed(&mut con, "items", "item").await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_insert_replace_and_delete() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        insert_indexed(&mut con, "items", "item", 3, &item(3, "a")).await.unwrap();
        assert!(replace_indexed(&mut con, "items", "item", 3, &item(3, "b"))
            .await
            .unwrap());

        let listed: Vec<Item> = load_indexed(&mut con, "items", "item").await.unwrap();
        assert_eq!(listed, vec![item(3, "b")]);

        assert!(delete_indexed(&mut con, "items", "item", 3).await.unwrap());
        assert!(!delete_indexed(&mut con, "items", "item", 3).await.unwrap());
    }
}
