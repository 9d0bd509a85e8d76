//! Client Tests
//!
//! Tests for the per-command wrappers: the bytes each one sends, the reply
//! shape each one decodes, and argument checks that happen before any I/O.

#[path = "../common/mod.rs"]
mod common;

use common::{client, client_stream};
use kvlink::config::{DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_BULK_LEN};
use kvlink::protocol::{encode_command, Command};
use kvlink::{Aggregate, Config, KeyType, KvError, ResponseValue, SessionMode, SortOrder, SortParams};

fn sent(parts: &[&str]) -> Vec<u8> {
    encode_command(&Command::new(parts[0]).args(&parts[1..]))
}

fn assert_invalid<T: std::fmt::Debug>(result: kvlink::Result<T>) {
    match result {
        Err(KvError::InvalidArgument(_)) => {}
        other => panic!("Expected invalid argument, got {:?}", other),
    }
}

// =============================================================================
// String Command Tests
// =============================================================================

#[test]
fn test_set_and_get() {
    let mut c = client(b"+OK\r\n$5\r\nhello\r\n");

    assert_eq!(c.set("k", "hello").unwrap(), ResponseValue::Boolean(true));
    assert_eq!(c.get("k").unwrap().as_bytes().unwrap(), b"hello");

    let mut expected = sent(&["SET", "k", "hello"]);
    expected.extend(sent(&["GET", "k"]));
    assert_eq!(client_stream(&c).written, expected);
}

#[test]
fn test_get_missing_key() {
    let mut c = client(b"$-1\r\n");
    assert!(c.get("nope").unwrap().is_absent());
}

#[test]
fn test_setnx_and_incr_by() {
    let mut c = client(b":0\r\n:15\r\n");

    assert_eq!(c.setnx("k", "v").unwrap(), ResponseValue::Boolean(false));
    assert_eq!(c.incr_by("n", 5).unwrap(), ResponseValue::Integer(15));
    assert!(client_stream(&c).written.ends_with(&sent(&["INCRBY", "n", "5"])));
}

#[test]
fn test_getrange() {
    let mut c = client(b"$3\r\nell\r\n");
    c.getrange("k", 1, -2).unwrap();
    assert_eq!(client_stream(&c).written, sent(&["GETRANGE", "k", "1", "-2"]));
}

#[test]
fn test_mget_returns_hash_of_present_keys() {
    let mut c = client(b"*3\r\n$2\r\nv1\r\n$-1\r\n$2\r\nv3\r\n");

    let value = c.mget(&["k1", "k2", "k3"]).unwrap();
    let map = value.as_hash().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&b"k3"[..]), Some(&b"v3".to_vec()));
    assert!(!map.contains_key(&b"k2"[..]));
}

#[test]
fn test_mget_without_keys() {
    let mut c = client(b"");
    let none: [&str; 0] = [];
    assert_invalid(c.mget(&none));
    assert_eq!(client_stream(&c).write_calls, 0);
}

#[test]
fn test_mset_interleaves_pairs() {
    let mut c = client(b"+OK\r\n");
    c.mset(&["a", "b"], &["1", "2"]).unwrap();
    assert_eq!(client_stream(&c).written, sent(&["MSET", "a", "1", "b", "2"]));
}

#[test]
fn test_mset_length_mismatch_sends_nothing() {
    let mut c = client(b"");
    assert_invalid(c.mset(&["a", "b"], &["1"]));
    assert_invalid(c.msetnx(&["a"], &["1", "2"]));
    assert_eq!(client_stream(&c).write_calls, 0);
}

// =============================================================================
// Key and Server Command Tests
// =============================================================================

#[test]
fn test_type_of() {
    let mut c = client(b"+zset\r\n");
    assert_eq!(c.type_of("z").unwrap().as_key_type().unwrap(), KeyType::ZSet);
}

#[test]
fn test_expire_is_boolean() {
    let mut c = client(b":1\r\n");
    assert_eq!(c.expire("k", 60).unwrap(), ResponseValue::Boolean(true));
    assert_eq!(client_stream(&c).written, sent(&["EXPIRE", "k", "60"]));
}

#[test]
fn test_del_many() {
    let mut c = client(b":2\r\n");
    assert_eq!(c.del_many(&["a", "b"]).unwrap(), ResponseValue::Integer(2));
    assert_eq!(client_stream(&c).written, sent(&["DEL", "a", "b"]));
}

#[test]
fn test_ping() {
    let mut c = client(b"+PONG\r\n");
    assert_eq!(c.ping().unwrap(), ResponseValue::Boolean(true));
}

#[test]
fn test_info() {
    let blob = b"role:master\r\nuptime_in_seconds:10\r\n";
    let mut reply = format!("${}\r\n", blob.len()).into_bytes();
    reply.extend_from_slice(blob);
    reply.extend_from_slice(b"\r\n");

    let mut c = client(&reply);
    let info = c.info().unwrap();
    assert_eq!(info.as_hash().unwrap().get(&b"role"[..]), Some(&b"master".to_vec()));
}

#[test]
fn test_config_get() {
    let mut c = client(b"*2\r\n$9\r\nmaxmemory\r\n$1\r\n0\r\n");
    let value = c.config_get("maxmemory").unwrap();
    assert_eq!(
        value.as_hash().unwrap().get(&b"maxmemory"[..]),
        Some(&b"0".to_vec())
    );
    assert_eq!(client_stream(&c).written, sent(&["CONFIG", "GET", "maxmemory"]));
}

#[test]
fn test_sort_with_clauses() {
    let mut c = client(b"*1\r\n$1\r\nx\r\n");
    let params = SortParams::new()
        .by("w_*")
        .limit(0, 10)
        .get("o_*")
        .order(SortOrder::Desc)
        .alpha();

    assert!(c.sort_with("list", &params).unwrap().as_array().is_ok());
    assert_eq!(
        client_stream(&c).written,
        sent(&["SORT", "list", "BY", "w_*", "LIMIT", "0", "10", "GET", "o_*", "DESC", "ALPHA"])
    );
}

#[test]
fn test_sort_with_store_counts() {
    let mut c = client(b":3\r\n");
    let params = SortParams::new().store("dst");

    assert_eq!(c.sort_with("list", &params).unwrap(), ResponseValue::Integer(3));
    assert_eq!(client_stream(&c).written, sent(&["SORT", "list", "STORE", "dst"]));
}

// =============================================================================
// Collection Command Tests
// =============================================================================

#[test]
fn test_lrange() {
    let mut c = client(b"*2\r\n$1\r\na\r\n$1\r\nb\r\n");
    let items = c.lrange("l", 0, -1).unwrap().into_array().unwrap();
    assert_eq!(items, vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn test_blpop_timeout_is_empty() {
    let mut c = client(b"*-1\r\n");
    assert_eq!(c.blpop(&["q"], 1).unwrap(), ResponseValue::Array(vec![]));
    assert_eq!(client_stream(&c).written, sent(&["BLPOP", "q", "1"]));
}

#[test]
fn test_set_store_operation() {
    let mut c = client(b":4\r\n");
    c.sunionstore("dst", &["a", "b"]).unwrap();
    assert_eq!(client_stream(&c).written, sent(&["SUNIONSTORE", "dst", "a", "b"]));

    let none: [&str; 0] = [];
    assert_invalid(c.sinter(&none));
}

#[test]
fn test_zadd_and_zscore() {
    let mut c = client(b":1\r\n$3\r\n1.5\r\n$-1\r\n");

    assert_eq!(c.zadd("z", 1.5, "m").unwrap(), ResponseValue::Boolean(true));
    assert_eq!(c.zscore("z", "m").unwrap(), ResponseValue::Double(1.5));
    assert!(c.zscore("z", "ghost").unwrap().is_absent());

    assert!(client_stream(&c).written.starts_with(&sent(&["ZADD", "z", "1.5", "m"])));
}

#[test]
fn test_zrangebyscore_with_limit() {
    let mut c = client(b"*0\r\n");
    c.zrangebyscore("z", 0.0, 2.5, Some((1, 5)), true).unwrap();
    assert_eq!(
        client_stream(&c).written,
        sent(&["ZRANGEBYSCORE", "z", "0", "2.5", "LIMIT", "1", "5", "WITHSCORES"])
    );
}

#[test]
fn test_zunionstore_with_weights() {
    let mut c = client(b":2\r\n");
    c.zunionstore("out", &["a", "b"], &[1.0, 0.5], Some(Aggregate::Max))
        .unwrap();
    assert_eq!(
        client_stream(&c).written,
        sent(&["ZUNIONSTORE", "out", "2", "a", "b", "WEIGHTS", "1", "0.5", "AGGREGATE", "MAX"])
    );
}

#[test]
fn test_zinterstore_rejects_weight_count() {
    let mut c = client(b"");
    assert_invalid(c.zinterstore("out", &["a", "b"], &[1.0], None));
    let none: [&str; 0] = [];
    assert_invalid(c.zunionstore("out", &none, &[], None));
    assert_eq!(client_stream(&c).write_calls, 0);
}

#[test]
fn test_hgetall() {
    let mut c = client(b"*4\r\n$1\r\nf\r\n$1\r\nv\r\n$1\r\ng\r\n$1\r\nw\r\n");
    let map = c.hgetall("h").unwrap().into_hash().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&b"g"[..]), Some(&b"w".to_vec()));
}

#[test]
fn test_wrong_shape_reply_from_wrapper() {
    let mut c = client(b"+OK\r\n");
    let value = c.incr("n").unwrap();
    assert_eq!(value, ResponseValue::Error(None));
    assert!(matches!(value.as_integer(), Err(KvError::TypeMismatch { .. })));
}

// =============================================================================
// Batching Through the Client
// =============================================================================

#[test]
fn test_client_pipeline() {
    let mut c = client(b"+OK\r\n$1\r\nv\r\n");
    c.pipeline().unwrap();
    assert_eq!(c.mode(), SessionMode::Pipeline);

    assert!(c.set("k", "v").unwrap().is_queued());
    assert!(c.get("k").unwrap().is_queued());

    let results = c.exec().unwrap();
    assert_eq!(results[1].as_bytes().unwrap(), b"v");
    assert_eq!(client_stream(&c).write_calls, 1);
}

#[test]
fn test_client_transaction() {
    let mut c = client(b"+OK\r\n+QUEUED\r\n*1\r\n:7\r\n");
    c.multi().unwrap();
    c.incr("n").unwrap();
    assert_eq!(c.exec().unwrap(), vec![ResponseValue::Integer(7)]);
    assert_eq!(c.mode(), SessionMode::Normal);
}

#[test]
fn test_validation_error_inside_pipeline_queues_nothing() {
    let mut c = client(b"");
    c.pipeline().unwrap();
    assert_invalid(c.mset(&["a"], &["1", "2"]));
    assert_eq!(c.session().pending(), 0);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.addr(), "127.0.0.1:6379");
    assert_eq!(config.max_bulk_len, DEFAULT_MAX_BULK_LEN);
    assert_eq!(config.max_array_len, DEFAULT_MAX_ARRAY_LEN);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder() {
    let config = Config::builder()
        .host("cache.local")
        .port(7000)
        .read_timeout_ms(0)
        .nodelay(false)
        .max_bulk_len(1024)
        .build();

    assert_eq!(config.addr(), "cache.local:7000");
    assert_eq!(config.read_timeout_ms, 0);
    assert!(!config.nodelay);
    assert_eq!(config.max_bulk_len, 1024);
}

#[test]
fn test_config_validation() {
    for config in [
        Config::builder().host("").build(),
        Config::builder().port(0).build(),
        Config::builder().max_array_len(0).build(),
    ] {
        assert!(matches!(config.validate(), Err(KvError::Config(_))));
    }
}
