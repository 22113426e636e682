//! Administrator Redis operations.
//!
//! Redis key patterns:
//! - `admin:{id}` - administrator record (JSON, includes the password hash)
//! - `admin_username:{username}` - username lookup to id (STRING, set with NX)
//! - `admins` - SET of administrator ids
//! - `seq:admin` - id sequence
//!
//! Record JSON is wrapped in `Zeroizing` so the password hash does not linger
//! in freed buffers.

use crate::auth::CredentialStore;
use crate::models::Administrator;
use redis::AsyncCommands;
use zeroize::Zeroizing;

const INDEX_KEY: &str = "admins";
const SEQ_KEY: &str = "seq:admin";

/// Get an administrator by id.
pub async fn get_admin<C>(con: &mut C, id: u64) -> Result<Option<Administrator>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("admin:{}", id);
    let json: Option<String> = con.get(&key).await?;

    match json {
        Some(data) => {
            let zeroizing_data = Zeroizing::new(data);
            Ok(Some(super::from_json(&zeroizing_data)?))
        }
        None => Ok(None),
    }
}

/// Get an administrator by exact (case-sensitive) username.
pub async fn get_admin_by_username<C>(
    con: &mut C,
    username: &str,
) -> Result<Option<Administrator>, redis::RedisError>
where
    C: AsyncCommands,
{
    let lookup_key = format!("admin_username:{}", username);
    let id: Option<u64> = con.get(&lookup_key).await?;

    match id {
        Some(id) => get_admin(con, id).await,
        None => Ok(None),
    }
}

/// Create an active administrator.
///
/// Returns `None` when the username is already taken. The username claim,
/// the record and the index entry are written by one script, so a failed
/// creation leaves no lookup key behind and concurrent creations cannot both
/// succeed. Ids are only allocated once the username looks free; two racing
/// creations of the same name can still leave a gap in the sequence.
pub async fn create_admin<C>(
    con: &mut C,
    username: &str,
    password_hash: &str,
) -> Result<Option<Administrator>, redis::RedisError>
where
    C: AsyncCommands,
{
    let lookup_key = format!("admin_username:{}", username);
    let taken: bool = con.exists(&lookup_key).await?;
    if taken {
        return Ok(None);
    }

    let id = super::next_id(con, SEQ_KEY).await?;
    let admin = Administrator {
        id,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        is_active: true,
    };
    let json = Zeroizing::new(super::to_json(&admin)?);

    let script = redis::Script::new(
        r#"
        if not redis.call('SET', KEYS[1], ARGV[1], 'NX') then
            return 0
        end
        redis.call('SET', KEYS[2], ARGV[2])
        redis.call('SADD', KEYS[3], ARGV[1])
        return 1
        "#,
    );
    let created: i32 = script
        .key(&lookup_key)
        .key(format!("admin:{}", id))
        .key(INDEX_KEY)
        .arg(id)
        .arg(json.as_str())
        .invoke_async(con)
        .await?;

    Ok((created == 1).then_some(admin))
}

/// Enable or disable an administrator. Returns false if the id is unknown.
pub async fn set_admin_active<C>(con: &mut C, id: u64, is_active: bool) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let Some(mut admin) = get_admin(con, id).await? else {
        return Ok(false);
    };
    admin.is_active = is_active;
    let json = Zeroizing::new(super::to_json(&admin)?);
    con.set::<_, _, ()>(format!("admin:{}", id), json.as_str())
        .await?;
    Ok(true)
}

pub async fn count_admins<C>(con: &mut C) -> Result<usize, redis::RedisError>
where
    C: AsyncCommands,
{
    con.scard(INDEX_KEY).await
}

impl CredentialStore for redis::aio::MultiplexedConnection {
    async fn find_administrator_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Administrator>, redis::RedisError> {
        get_admin_by_username(self, username).await
    }
}
