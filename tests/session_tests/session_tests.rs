//! Session Tests
//!
//! Tests for normal, transaction, and pipeline execution over a scripted
//! stream.

#[path = "../common/mod.rs"]
mod common;

use common::{session, stream_of};
use kvlink::protocol::{encode_command, Command, Decoder};
use kvlink::{KvError, ResponseValue, SessionMode};

fn cmd(parts: &[&str]) -> Command {
    Command::new(parts[0]).args(&parts[1..])
}

fn encoded(parts: &[&str]) -> Vec<u8> {
    encode_command(&cmd(parts))
}

fn mget(keys: &[&str]) -> (Command, Decoder) {
    (
        Command::new("MGET").args(keys),
        Decoder::MultiGet {
            keys: keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
        },
    )
}

// =============================================================================
// Normal Mode Tests
// =============================================================================

#[test]
fn test_normal_round_trip() {
    let mut s = session(b"+OK\r\n$1\r\nv\r\n");

    let set = s.submit(cmd(&["SET", "k", "v"]), Decoder::Status).unwrap();
    assert_eq!(set, ResponseValue::Boolean(true));

    let get = s.submit(cmd(&["GET", "k"]), Decoder::Bulk).unwrap();
    assert_eq!(get, ResponseValue::BulkString(b"v".to_vec()));

    let mut expected = encoded(&["SET", "k", "v"]);
    expected.extend(encoded(&["GET", "k"]));
    assert_eq!(stream_of(&s).written, expected);
    assert_eq!(stream_of(&s).write_calls, 2);
}

#[test]
fn test_normal_error_reply_is_a_value() {
    let mut s = session(b"-ERR wrong kind\r\n:1\r\n");

    let reply = s.submit(cmd(&["INCR", "k"]), Decoder::Integer).unwrap();
    assert_eq!(reply.error_message(), Some("ERR wrong kind"));

    // The stream stays usable
    let next = s.submit(cmd(&["INCR", "j"]), Decoder::Integer).unwrap();
    assert_eq!(next, ResponseValue::Integer(1));
    assert!(!s.is_broken());
}

#[test]
fn test_exec_and_discard_in_normal_mode() {
    let mut s = session(b"");

    assert!(s.exec().unwrap().is_empty());
    s.discard().unwrap();

    assert_eq!(s.mode(), SessionMode::Normal);
    assert_eq!(stream_of(&s).write_calls, 0);
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_pipeline_single_write_fifo_results() {
    let mut s = session(b"+OK\r\n:1\r\n$1\r\nv\r\n");
    s.begin_pipeline().unwrap();
    assert_eq!(s.mode(), SessionMode::Pipeline);

    for (parts, decoder) in [
        (&["SET", "k", "v"][..], Decoder::Status),
        (&["INCR", "n"][..], Decoder::Integer),
        (&["GET", "k"][..], Decoder::Bulk),
    ] {
        assert_eq!(s.submit(cmd(parts), decoder).unwrap(), ResponseValue::Queued);
    }
    assert_eq!(s.pending(), 3);
    assert_eq!(stream_of(&s).write_calls, 0);

    let results = s.exec().unwrap();
    assert_eq!(
        results,
        vec![
            ResponseValue::Boolean(true),
            ResponseValue::Integer(1),
            ResponseValue::BulkString(b"v".to_vec()),
        ]
    );
    assert_eq!(stream_of(&s).write_calls, 1);
    assert_eq!(s.mode(), SessionMode::Normal);
    assert_eq!(s.pending(), 0);

    let mut expected = encoded(&["SET", "k", "v"]);
    expected.extend(encoded(&["INCR", "n"]));
    expected.extend(encoded(&["GET", "k"]));
    assert_eq!(stream_of(&s).written, expected);
}

#[test]
fn test_empty_pipeline() {
    let mut s = session(b"");
    s.begin_pipeline().unwrap();

    assert!(s.exec().unwrap().is_empty());
    assert_eq!(stream_of(&s).write_calls, 0);
    assert_eq!(s.mode(), SessionMode::Normal);
}

#[test]
fn test_pipeline_keeps_keys_per_multi_get() {
    let mut s = session(b"*2\r\n$1\r\n1\r\n$-1\r\n*1\r\n$1\r\n3\r\n");
    s.begin_pipeline().unwrap();

    let (first, first_decoder) = mget(&["a", "b"]);
    let (second, second_decoder) = mget(&["c"]);
    s.submit(first, first_decoder).unwrap();
    s.submit(second, second_decoder).unwrap();

    let results = s.exec().unwrap();
    assert_eq!(results.len(), 2);

    let first = results[0].as_hash().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first.get(&b"a"[..]), Some(&b"1".to_vec()));

    let second = results[1].as_hash().unwrap();
    assert_eq!(second.get(&b"c"[..]), Some(&b"3".to_vec()));
}

#[test]
fn test_pipeline_error_reply_in_the_middle() {
    let mut s = session(b":1\r\n-ERR no\r\n:3\r\n");
    s.begin_pipeline().unwrap();
    for key in ["a", "b", "c"] {
        s.submit(cmd(&["INCR", key]), Decoder::Integer).unwrap();
    }

    let results = s.exec().unwrap();
    assert_eq!(results[0], ResponseValue::Integer(1));
    assert_eq!(results[1].error_message(), Some("ERR no"));
    assert_eq!(results[2], ResponseValue::Integer(3));
}

#[test]
fn test_discard_pipeline_does_no_io() {
    let mut s = session(b":9\r\n");
    s.begin_pipeline().unwrap();
    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();

    s.discard().unwrap();
    assert_eq!(s.mode(), SessionMode::Normal);
    assert_eq!(s.pending(), 0);
    assert_eq!(stream_of(&s).write_calls, 0);

    // Nothing from the dropped batch leaks into the next command
    let reply = s.submit(cmd(&["INCR", "m"]), Decoder::Integer).unwrap();
    assert_eq!(reply, ResponseValue::Integer(9));
    assert_eq!(stream_of(&s).written, encoded(&["INCR", "m"]));
}

// =============================================================================
// Transaction Tests
// =============================================================================

#[test]
fn test_transaction_round_trip() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n+QUEUED\r\n*2\r\n+OK\r\n:1\r\n");
    s.begin_transaction().unwrap();
    assert_eq!(s.mode(), SessionMode::Transaction);

    assert!(s.submit(cmd(&["SET", "k", "v"]), Decoder::Status).unwrap().is_queued());
    assert!(s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap().is_queued());
    assert_eq!(s.pending(), 2);

    let results = s.exec().unwrap();
    assert_eq!(
        results,
        vec![ResponseValue::Boolean(true), ResponseValue::Integer(1)]
    );
    assert_eq!(s.mode(), SessionMode::Normal);

    // MULTI, one write per command, EXEC
    assert_eq!(stream_of(&s).write_calls, 4);

    let mut expected = encoded(&["MULTI"]);
    expected.extend(encoded(&["SET", "k", "v"]));
    expected.extend(encoded(&["INCR", "n"]));
    expected.extend(encoded(&["EXEC"]));
    assert_eq!(stream_of(&s).written, expected);
}

#[test]
fn test_empty_transaction() {
    let mut s = session(b"+OK\r\n*0\r\n");
    s.begin_transaction().unwrap();

    assert!(s.exec().unwrap().is_empty());
    assert_eq!(stream_of(&s).write_calls, 2);
}

#[test]
fn test_transaction_decodes_nested_replies() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n+QUEUED\r\n*2\r\n*2\r\n$1\r\na\r\n$1\r\nb\r\n$-1\r\n");
    s.begin_transaction().unwrap();
    s.submit(cmd(&["LRANGE", "l", "0", "-1"]), Decoder::MultiBulk).unwrap();
    s.submit(cmd(&["GET", "missing"]), Decoder::Bulk).unwrap();

    let results = s.exec().unwrap();
    assert_eq!(
        results,
        vec![
            ResponseValue::Array(vec![b"a".to_vec(), b"b".to_vec()]),
            ResponseValue::Absent,
        ]
    );
}

#[test]
fn test_multi_rejected() {
    let mut s = session(b"-ERR MULTI calls can not be nested\r\n");

    match s.begin_transaction() {
        Err(KvError::UnexpectedReply(_)) => {}
        other => panic!("Expected unexpected reply, got {:?}", other),
    }
    assert_eq!(s.mode(), SessionMode::Normal);
    assert!(!s.is_broken());
}

#[test]
fn test_rejected_command_is_not_queued() {
    let mut s = session(b"+OK\r\n-ERR unknown command 'FOO'\r\n+QUEUED\r\n*1\r\n:5\r\n");
    s.begin_transaction().unwrap();

    let rejected = s.submit(cmd(&["FOO"]), Decoder::Status).unwrap();
    assert_eq!(rejected.error_message(), Some("ERR unknown command 'FOO'"));
    assert_eq!(s.pending(), 0);

    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();
    assert_eq!(s.exec().unwrap(), vec![ResponseValue::Integer(5)]);
}

#[test]
fn test_unexpected_ack() {
    let mut s = session(b"+OK\r\n:1\r\n");
    s.begin_transaction().unwrap();

    match s.submit(cmd(&["INCR", "n"]), Decoder::Integer) {
        Err(KvError::UnexpectedReply(_)) => {}
        other => panic!("Expected unexpected reply, got {:?}", other),
    }
    assert_eq!(s.pending(), 0);
}

#[test]
fn test_exec_abort() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n-EXECABORT Transaction discarded because of previous errors.\r\n");
    s.begin_transaction().unwrap();
    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();

    match s.exec() {
        Err(KvError::TransactionAborted(msg)) => assert!(msg.starts_with("EXECABORT")),
        other => panic!("Expected aborted transaction, got {:?}", other),
    }
    assert_eq!(s.mode(), SessionMode::Normal);
    assert_eq!(s.pending(), 0);
}

#[test]
fn test_exec_null_reply_aborts() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n*-1\r\n");
    s.begin_transaction().unwrap();
    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();

    assert!(matches!(s.exec(), Err(KvError::TransactionAborted(_))));
}

#[test]
fn test_exec_reply_count_mismatch() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n*2\r\n:1\r\n:2\r\n");
    s.begin_transaction().unwrap();
    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();

    assert!(matches!(s.exec(), Err(KvError::UnexpectedReply(_))));
    assert_eq!(s.mode(), SessionMode::Normal);
}

#[test]
fn test_discard_transaction() {
    let mut s = session(b"+OK\r\n+QUEUED\r\n+OK\r\n");
    s.begin_transaction().unwrap();
    s.submit(cmd(&["INCR", "n"]), Decoder::Integer).unwrap();

    s.discard().unwrap();
    assert_eq!(s.mode(), SessionMode::Normal);
    assert_eq!(s.pending(), 0);
    assert!(stream_of(&s).written.ends_with(&encoded(&["DISCARD"])));
}

// =============================================================================
// Mode Conflict Tests
// =============================================================================

#[test]
fn test_transaction_inside_pipeline_rejected() {
    let mut s = session(b"");
    s.begin_pipeline().unwrap();

    match s.begin_transaction() {
        Err(KvError::ModeConflict { active, requested }) => {
            assert_eq!(active, SessionMode::Pipeline);
            assert_eq!(requested, SessionMode::Transaction);
        }
        other => panic!("Expected mode conflict, got {:?}", other),
    }
    assert_eq!(s.mode(), SessionMode::Pipeline);
    assert_eq!(stream_of(&s).write_calls, 0);
}

#[test]
fn test_pipeline_inside_transaction_rejected() {
    let mut s = session(b"+OK\r\n");
    s.begin_transaction().unwrap();

    assert!(matches!(
        s.begin_pipeline(),
        Err(KvError::ModeConflict { .. })
    ));
    assert!(matches!(
        s.begin_transaction(),
        Err(KvError::ModeConflict { .. })
    ));
    assert_eq!(s.mode(), SessionMode::Transaction);
    assert_eq!(stream_of(&s).write_calls, 1);
}

#[test]
fn test_nested_pipeline_rejected() {
    let mut s = session(b"");
    s.begin_pipeline().unwrap();
    assert!(matches!(
        s.begin_pipeline(),
        Err(KvError::ModeConflict { .. })
    ));
}

// =============================================================================
// Fatal Error Tests
// =============================================================================

#[test]
fn test_truncated_reply_breaks_connection() {
    let mut s = session(b"$5\r\nhel");

    assert!(matches!(
        s.submit(cmd(&["GET", "k"]), Decoder::Bulk),
        Err(KvError::Io(_))
    ));
    assert!(s.is_broken());

    assert!(matches!(
        s.submit(cmd(&["GET", "k"]), Decoder::Bulk),
        Err(KvError::ConnectionBroken)
    ));
    // Nothing was sent after the failure
    assert_eq!(stream_of(&s).write_calls, 1);
}

#[test]
fn test_malformed_length_breaks_connection() {
    let mut s = session(b"$x\r\n+OK\r\n");

    assert!(matches!(
        s.submit(cmd(&["GET", "k"]), Decoder::Bulk),
        Err(KvError::Protocol(_))
    ));

    s.begin_pipeline().unwrap();
    assert!(matches!(
        s.submit(cmd(&["PING"]), Decoder::SingleLine),
        Err(KvError::ConnectionBroken)
    ));
}

#[test]
fn test_pipeline_truncated_midway() {
    let mut s = session(b":1\r\n:2");
    s.begin_pipeline().unwrap();
    s.submit(cmd(&["INCR", "a"]), Decoder::Integer).unwrap();
    s.submit(cmd(&["INCR", "b"]), Decoder::Integer).unwrap();

    assert!(matches!(s.exec(), Err(KvError::Io(_))));
    assert!(s.is_broken());
    assert_eq!(s.mode(), SessionMode::Normal);
}
