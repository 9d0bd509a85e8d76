//! Client Module
//!
//! The public face of the crate: one method per remote command, each of
//! which builds a [`Command`], picks the [`Decoder`] for its reply and
//! submits both to the [`Session`].
//!
//! Every method returns whatever the session returns: the decoded reply in
//! normal mode, or `Queued` inside a transaction or pipeline, with the real
//! reply delivered later by [`Client::exec`].

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::network::Connection;
use crate::protocol::{Command, DecodeLimits, Decoder, ResponseValue, SortParams};
use crate::session::{Session, SessionMode};

/// How ZUNIONSTORE / ZINTERSTORE combine scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn keyword(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

/// A synchronous client over a single connection
///
/// Not safe for concurrent use: every call runs to completion on the
/// calling thread, and a reply must be fully read before the next command
/// goes out.
pub struct Client<S: Read + Write = TcpStream> {
    session: Session<S>,
}

impl Client<TcpStream> {
    /// Connect using `config`
    pub fn connect(config: &Config) -> Result<Self> {
        Ok(Self {
            session: Session::connect(config)?,
        })
    }

    /// Connect to `host:port` with default settings
    pub fn open(host: impl Into<String>, port: u16) -> Result<Self> {
        let config = Config::builder().host(host).port(port).build();
        Self::connect(&config)
    }
}

impl<S: Read + Write> Client<S> {
    /// Build a client over an existing connection
    pub fn new(connection: Connection<S>) -> Self {
        Self {
            session: Session::new(connection),
        }
    }

    /// Build a client over any byte stream with default protocol limits
    pub fn from_stream(stream: S) -> Self {
        Self::new(Connection::new(stream, DecodeLimits::default()))
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    /// Submit an arbitrary command with the decoder for its reply
    pub fn run(&mut self, command: Command, decoder: Decoder) -> Result<ResponseValue> {
        self.session.submit(command, decoder)
    }

    // =========================================================================
    // Batching
    // =========================================================================

    /// Start a transaction (MULTI)
    pub fn multi(&mut self) -> Result<()> {
        self.session.begin_transaction()
    }

    /// Start a pipeline
    pub fn pipeline(&mut self) -> Result<()> {
        self.session.begin_pipeline()
    }

    /// Run the open transaction or pipeline
    pub fn exec(&mut self) -> Result<Vec<ResponseValue>> {
        self.session.exec()
    }

    /// Drop the open transaction or pipeline
    pub fn discard(&mut self) -> Result<()> {
        self.session.discard()
    }

    // =========================================================================
    // Connection / Server
    // =========================================================================

    pub fn auth(&mut self, password: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("AUTH").arg(password), Decoder::Status)
    }

    pub fn select(&mut self, index: i64) -> Result<ResponseValue> {
        self.run(Command::new("SELECT").arg_int(index), Decoder::Status)
    }

    pub fn ping(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("PING"), Decoder::Status)
    }

    pub fn dbsize(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("DBSIZE"), Decoder::Integer)
    }

    pub fn lastsave(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("LASTSAVE"), Decoder::Integer)
    }

    pub fn flushdb(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("FLUSHDB"), Decoder::Status)
    }

    pub fn flushall(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("FLUSHALL"), Decoder::Status)
    }

    pub fn save(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("SAVE"), Decoder::Status)
    }

    pub fn bgsave(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("BGSAVE"), Decoder::Status)
    }

    pub fn bgrewriteaof(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("BGREWRITEAOF"), Decoder::Status)
    }

    /// Server information as a field → value hash
    pub fn info(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("INFO"), Decoder::Info)
    }

    pub fn config_get(&mut self, parameter: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("CONFIG").arg("GET").arg(parameter),
            Decoder::KeyValueList,
        )
    }

    pub fn config_set(&mut self, parameter: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("CONFIG").arg("SET").arg(parameter).arg(value),
            Decoder::Status,
        )
    }

    // =========================================================================
    // Keys
    // =========================================================================

    pub fn keys(&mut self, pattern: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("KEYS").arg(pattern), Decoder::MultiBulk)
    }

    pub fn exists(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("EXISTS").arg(key), Decoder::IntegerAsBool)
    }

    pub fn del(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("DEL").arg(key), Decoder::Integer)
    }

    pub fn del_many<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<ResponseValue> {
        require_keys("DEL", keys)?;
        self.run(Command::new("DEL").args(keys), Decoder::Integer)
    }

    /// Type of the value stored at `key`
    pub fn type_of(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("TYPE").arg(key), Decoder::TypeName)
    }

    pub fn rename(&mut self, src: impl AsRef<[u8]>, dst: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("RENAME").arg(src).arg(dst), Decoder::Status)
    }

    pub fn renamenx(&mut self, src: impl AsRef<[u8]>, dst: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("RENAMENX").arg(src).arg(dst), Decoder::IntegerAsBool)
    }

    pub fn randomkey(&mut self) -> Result<ResponseValue> {
        self.run(Command::new("RANDOMKEY"), Decoder::Bulk)
    }

    pub fn ttl(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("TTL").arg(key), Decoder::Integer)
    }

    pub fn expire(&mut self, key: impl AsRef<[u8]>, seconds: i64) -> Result<ResponseValue> {
        self.run(Command::new("EXPIRE").arg(key).arg_int(seconds), Decoder::IntegerAsBool)
    }

    pub fn expireat(&mut self, key: impl AsRef<[u8]>, timestamp: i64) -> Result<ResponseValue> {
        self.run(Command::new("EXPIREAT").arg(key).arg_int(timestamp), Decoder::IntegerAsBool)
    }

    /// Move `key` to database `db`
    pub fn move_to(&mut self, key: impl AsRef<[u8]>, db: i64) -> Result<ResponseValue> {
        self.run(Command::new("MOVE").arg(key).arg_int(db), Decoder::IntegerAsBool)
    }

    pub fn sort(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SORT").arg(key), Decoder::MultiBulk)
    }

    /// SORT with clauses; with STORE the reply is the stored element count
    pub fn sort_with(&mut self, key: impl AsRef<[u8]>, params: &SortParams) -> Result<ResponseValue> {
        let decoder = if params.stores() {
            Decoder::Integer
        } else {
            Decoder::MultiBulk
        };
        self.run(params.build_command(key), decoder)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("GET").arg(key), Decoder::Bulk)
    }

    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SET").arg(key).arg(value), Decoder::Status)
    }

    pub fn getset(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("GETSET").arg(key).arg(value), Decoder::Bulk)
    }

    pub fn setnx(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SETNX").arg(key).arg(value), Decoder::IntegerAsBool)
    }

    /// Values of several keys as a hash; missing keys are left out
    pub fn mget<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<ResponseValue> {
        require_keys("MGET", keys)?;
        let requested = keys.iter().map(|k| k.as_ref().to_vec()).collect();
        self.run(
            Command::new("MGET").args(keys),
            Decoder::MultiGet { keys: requested },
        )
    }

    pub fn mset<K: AsRef<[u8]>, V: AsRef<[u8]>>(&mut self, keys: &[K], values: &[V]) -> Result<ResponseValue> {
        let command = pairs_command("MSET", keys, values)?;
        self.run(command, Decoder::Status)
    }

    pub fn msetnx<K: AsRef<[u8]>, V: AsRef<[u8]>>(&mut self, keys: &[K], values: &[V]) -> Result<ResponseValue> {
        let command = pairs_command("MSETNX", keys, values)?;
        self.run(command, Decoder::IntegerAsBool)
    }

    pub fn incr(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("INCR").arg(key), Decoder::Integer)
    }

    pub fn incr_by(&mut self, key: impl AsRef<[u8]>, by: i64) -> Result<ResponseValue> {
        self.run(Command::new("INCRBY").arg(key).arg_int(by), Decoder::Integer)
    }

    pub fn decr(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("DECR").arg(key), Decoder::Integer)
    }

    pub fn decr_by(&mut self, key: impl AsRef<[u8]>, by: i64) -> Result<ResponseValue> {
        self.run(Command::new("DECRBY").arg(key).arg_int(by), Decoder::Integer)
    }

    pub fn append(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("APPEND").arg(key).arg(value), Decoder::Integer)
    }

    pub fn getrange(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64) -> Result<ResponseValue> {
        self.run(
            Command::new("GETRANGE").arg(key).arg_int(start).arg_int(end),
            Decoder::Bulk,
        )
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn lpush(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("LPUSH").arg(key).arg(value), Decoder::Integer)
    }

    pub fn rpush(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("RPUSH").arg(key).arg(value), Decoder::Integer)
    }

    pub fn llen(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("LLEN").arg(key), Decoder::Integer)
    }

    pub fn lrange(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64) -> Result<ResponseValue> {
        self.run(
            Command::new("LRANGE").arg(key).arg_int(start).arg_int(end),
            Decoder::MultiBulk,
        )
    }

    pub fn ltrim(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64) -> Result<ResponseValue> {
        self.run(
            Command::new("LTRIM").arg(key).arg_int(start).arg_int(end),
            Decoder::Status,
        )
    }

    pub fn lindex(&mut self, key: impl AsRef<[u8]>, index: i64) -> Result<ResponseValue> {
        self.run(Command::new("LINDEX").arg(key).arg_int(index), Decoder::Bulk)
    }

    pub fn lset(&mut self, key: impl AsRef<[u8]>, index: i64, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("LSET").arg(key).arg_int(index).arg(value),
            Decoder::Status,
        )
    }

    pub fn lrem(&mut self, key: impl AsRef<[u8]>, count: i64, value: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("LREM").arg(key).arg_int(count).arg(value),
            Decoder::Integer,
        )
    }

    pub fn lpop(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("LPOP").arg(key), Decoder::Bulk)
    }

    pub fn rpop(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("RPOP").arg(key), Decoder::Bulk)
    }

    /// Blocking pop; the reply is `[key, value]`, or empty on timeout
    pub fn blpop<K: AsRef<[u8]>>(&mut self, keys: &[K], timeout_secs: i64) -> Result<ResponseValue> {
        require_keys("BLPOP", keys)?;
        self.run(
            Command::new("BLPOP").args(keys).arg_int(timeout_secs),
            Decoder::MultiBulk,
        )
    }

    pub fn brpop<K: AsRef<[u8]>>(&mut self, keys: &[K], timeout_secs: i64) -> Result<ResponseValue> {
        require_keys("BRPOP", keys)?;
        self.run(
            Command::new("BRPOP").args(keys).arg_int(timeout_secs),
            Decoder::MultiBulk,
        )
    }

    pub fn rpoplpush(&mut self, src: impl AsRef<[u8]>, dst: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("RPOPLPUSH").arg(src).arg(dst), Decoder::Bulk)
    }

    // =========================================================================
    // Sets
    // =========================================================================

    pub fn sadd(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SADD").arg(key).arg(member), Decoder::IntegerAsBool)
    }

    pub fn srem(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SREM").arg(key).arg(member), Decoder::IntegerAsBool)
    }

    pub fn spop(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SPOP").arg(key), Decoder::Bulk)
    }

    pub fn scard(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SCARD").arg(key), Decoder::Integer)
    }

    pub fn sismember(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SISMEMBER").arg(key).arg(member), Decoder::IntegerAsBool)
    }

    pub fn smembers(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SMEMBERS").arg(key), Decoder::MultiBulk)
    }

    pub fn srandmember(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("SRANDMEMBER").arg(key), Decoder::Bulk)
    }

    pub fn smove(
        &mut self,
        src: impl AsRef<[u8]>,
        dst: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<ResponseValue> {
        self.run(
            Command::new("SMOVE").arg(src).arg(dst).arg(member),
            Decoder::IntegerAsBool,
        )
    }

    pub fn sinter<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<ResponseValue> {
        self.set_operation("SINTER", keys)
    }

    pub fn sunion<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<ResponseValue> {
        self.set_operation("SUNION", keys)
    }

    pub fn sdiff<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<ResponseValue> {
        self.set_operation("SDIFF", keys)
    }

    pub fn sinterstore<K: AsRef<[u8]>>(&mut self, dst: impl AsRef<[u8]>, keys: &[K]) -> Result<ResponseValue> {
        self.set_store_operation("SINTERSTORE", dst, keys)
    }

    pub fn sunionstore<K: AsRef<[u8]>>(&mut self, dst: impl AsRef<[u8]>, keys: &[K]) -> Result<ResponseValue> {
        self.set_store_operation("SUNIONSTORE", dst, keys)
    }

    pub fn sdiffstore<K: AsRef<[u8]>>(&mut self, dst: impl AsRef<[u8]>, keys: &[K]) -> Result<ResponseValue> {
        self.set_store_operation("SDIFFSTORE", dst, keys)
    }

    fn set_operation<K: AsRef<[u8]>>(&mut self, keyword: &str, keys: &[K]) -> Result<ResponseValue> {
        require_keys(keyword, keys)?;
        self.run(Command::new(keyword).args(keys), Decoder::MultiBulk)
    }

    fn set_store_operation<K: AsRef<[u8]>>(
        &mut self,
        keyword: &str,
        dst: impl AsRef<[u8]>,
        keys: &[K],
    ) -> Result<ResponseValue> {
        require_keys(keyword, keys)?;
        self.run(Command::new(keyword).arg(dst).args(keys), Decoder::Integer)
    }

    // =========================================================================
    // Sorted Sets
    // =========================================================================

    pub fn zadd(&mut self, key: impl AsRef<[u8]>, score: f64, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("ZADD").arg(key).arg_double(score).arg(member),
            Decoder::IntegerAsBool,
        )
    }

    pub fn zrem(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("ZREM").arg(key).arg(member), Decoder::IntegerAsBool)
    }

    pub fn zincrby(&mut self, key: impl AsRef<[u8]>, by: f64, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(
            Command::new("ZINCRBY").arg(key).arg_double(by).arg(member),
            Decoder::Double,
        )
    }

    pub fn zscore(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("ZSCORE").arg(key).arg(member), Decoder::Double)
    }

    pub fn zrank(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("ZRANK").arg(key).arg(member), Decoder::Integer)
    }

    pub fn zrevrank(&mut self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("ZREVRANK").arg(key).arg(member), Decoder::Integer)
    }

    /// Members by rank; with scores the array alternates member and score
    pub fn zrange(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64, withscores: bool) -> Result<ResponseValue> {
        self.zrange_generic("ZRANGE", key, start, end, withscores)
    }

    pub fn zrevrange(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64, withscores: bool) -> Result<ResponseValue> {
        self.zrange_generic("ZREVRANGE", key, start, end, withscores)
    }

    fn zrange_generic(
        &mut self,
        keyword: &str,
        key: impl AsRef<[u8]>,
        start: i64,
        end: i64,
        withscores: bool,
    ) -> Result<ResponseValue> {
        self.run(
            Command::new(keyword)
                .arg(key)
                .arg_int(start)
                .arg_int(end)
                .arg_if(withscores, "WITHSCORES"),
            Decoder::MultiBulk,
        )
    }

    pub fn zrangebyscore(
        &mut self,
        key: impl AsRef<[u8]>,
        min: f64,
        max: f64,
        limit: Option<(i64, i64)>,
        withscores: bool,
    ) -> Result<ResponseValue> {
        let mut command = Command::new("ZRANGEBYSCORE")
            .arg(key)
            .arg_double(min)
            .arg_double(max);
        if let Some((offset, count)) = limit {
            command = command.arg("LIMIT").arg_int(offset).arg_int(count);
        }
        self.run(command.arg_if(withscores, "WITHSCORES"), Decoder::MultiBulk)
    }

    pub fn zcard(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("ZCARD").arg(key), Decoder::Integer)
    }

    pub fn zcount(&mut self, key: impl AsRef<[u8]>, min: f64, max: f64) -> Result<ResponseValue> {
        self.run(
            Command::new("ZCOUNT").arg(key).arg_double(min).arg_double(max),
            Decoder::Integer,
        )
    }

    pub fn zremrangebyrank(&mut self, key: impl AsRef<[u8]>, start: i64, end: i64) -> Result<ResponseValue> {
        self.run(
            Command::new("ZREMRANGEBYRANK").arg(key).arg_int(start).arg_int(end),
            Decoder::Integer,
        )
    }

    pub fn zremrangebyscore(&mut self, key: impl AsRef<[u8]>, min: f64, max: f64) -> Result<ResponseValue> {
        self.run(
            Command::new("ZREMRANGEBYSCORE").arg(key).arg_double(min).arg_double(max),
            Decoder::Integer,
        )
    }

    /// Union of sorted sets into `dst`; `weights` is empty or one per key
    pub fn zunionstore<K: AsRef<[u8]>>(
        &mut self,
        dst: impl AsRef<[u8]>,
        keys: &[K],
        weights: &[f64],
        aggregate: Option<Aggregate>,
    ) -> Result<ResponseValue> {
        let command = zstore_command("ZUNIONSTORE", dst, keys, weights, aggregate)?;
        self.run(command, Decoder::Integer)
    }

    /// Intersection of sorted sets into `dst`; `weights` is empty or one per key
    pub fn zinterstore<K: AsRef<[u8]>>(
        &mut self,
        dst: impl AsRef<[u8]>,
        keys: &[K],
        weights: &[f64],
        aggregate: Option<Aggregate>,
    ) -> Result<ResponseValue> {
        let command = zstore_command("ZINTERSTORE", dst, keys, weights, aggregate)?;
        self.run(command, Decoder::Integer)
    }

    // =========================================================================
    // Hashes
    // =========================================================================

    pub fn hset(
        &mut self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<ResponseValue> {
        self.run(
            Command::new("HSET").arg(key).arg(field).arg(value),
            Decoder::IntegerAsBool,
        )
    }

    pub fn hget(&mut self, key: impl AsRef<[u8]>, field: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HGET").arg(key).arg(field), Decoder::Bulk)
    }

    pub fn hdel(&mut self, key: impl AsRef<[u8]>, field: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HDEL").arg(key).arg(field), Decoder::IntegerAsBool)
    }

    pub fn hexists(&mut self, key: impl AsRef<[u8]>, field: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HEXISTS").arg(key).arg(field), Decoder::IntegerAsBool)
    }

    pub fn hlen(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HLEN").arg(key), Decoder::Integer)
    }

    pub fn hkeys(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HKEYS").arg(key), Decoder::MultiBulk)
    }

    pub fn hvals(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HVALS").arg(key), Decoder::MultiBulk)
    }

    pub fn hgetall(&mut self, key: impl AsRef<[u8]>) -> Result<ResponseValue> {
        self.run(Command::new("HGETALL").arg(key), Decoder::KeyValueList)
    }

    pub fn hincrby(&mut self, key: impl AsRef<[u8]>, field: impl AsRef<[u8]>, by: i64) -> Result<ResponseValue> {
        self.run(
            Command::new("HINCRBY").arg(key).arg(field).arg_int(by),
            Decoder::Integer,
        )
    }
}

// =============================================================================
// Argument validation
// =============================================================================

fn require_keys<K>(keyword: &str, keys: &[K]) -> Result<()> {
    if keys.is_empty() {
        return Err(KvError::InvalidArgument(format!(
            "{} needs at least one key",
            keyword
        )));
    }
    Ok(())
}

fn pairs_command<K: AsRef<[u8]>, V: AsRef<[u8]>>(keyword: &str, keys: &[K], values: &[V]) -> Result<Command> {
    require_keys(keyword, keys)?;
    if keys.len() != values.len() {
        return Err(KvError::InvalidArgument(format!(
            "{} got {} keys but {} values",
            keyword,
            keys.len(),
            values.len()
        )));
    }

    Ok(keys
        .iter()
        .zip(values)
        .fold(Command::new(keyword), |cmd, (k, v)| cmd.arg(k).arg(v)))
}

fn zstore_command<K: AsRef<[u8]>>(
    keyword: &str,
    dst: impl AsRef<[u8]>,
    keys: &[K],
    weights: &[f64],
    aggregate: Option<Aggregate>,
) -> Result<Command> {
    require_keys(keyword, keys)?;
    if !weights.is_empty() && weights.len() != keys.len() {
        return Err(KvError::InvalidArgument(format!(
            "{} got {} keys but {} weights",
            keyword,
            keys.len(),
            weights.len()
        )));
    }

    let mut command = Command::new(keyword)
        .arg(dst)
        .arg_int(keys.len() as i64)
        .args(keys);
    if !weights.is_empty() {
        command = weights
            .iter()
            .fold(command.arg("WEIGHTS"), |cmd, w| cmd.arg_double(*w));
    }
    if let Some(aggregate) = aggregate {
        command = command.arg("AGGREGATE").arg(aggregate.keyword());
    }
    Ok(command)
}
