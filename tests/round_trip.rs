//! End-to-end calls through the loopback transport.
//!
//! Covers argument classification, output write-back order, and how the
//! client treats failing or malformed responses.

use std::collections::{BTreeMap, LinkedList};

use ipc_call::demo::{self, api, Data};
use ipc_call::{
    codec, DecodeError, DispatchError, Dispatcher, Loopback, Registry, TransportError,
};

fn demo_transport() -> Loopback {
    Loopback::new(Dispatcher::new(demo::registry()))
}

// =============================================================================
// Scalars and containers
// =============================================================================

#[test]
fn test_sum_by_value() {
    let mut transport = demo_transport();
    assert_eq!(api::sum::call(3, 4).sync(&mut transport).unwrap(), 7);
}

#[test]
fn test_append_all_writes_back_target() {
    let mut transport = demo_transport();
    let items = vec!["x".to_string(), "y".to_string()];
    let mut target = vec!["w".to_string()];

    api::append_all::call(&items, &mut target)
        .sync(&mut transport)
        .unwrap();

    assert_eq!(target, vec!["w", "x", "y"]);
    assert_eq!(items, vec!["x", "y"]);
}

#[test]
fn test_swap_two_outputs() {
    let mut transport = demo_transport();
    let (mut a, mut b) = (1, 2);

    api::swap::call(&mut a, &mut b).sync(&mut transport).unwrap();

    assert_eq!((a, b), (2, 1));
}

#[test]
fn test_xyz_returns_records_and_extends_in_out() {
    let mut transport = demo_transport();
    let input = BTreeMap::from([("C".to_string(), 3), ("D".to_string(), 4)]);
    let mut in_out = vec![("A".to_string(), 1), ("B".to_string(), 2)];

    let records = api::xyz::call(&input, &mut in_out)
        .sync(&mut transport)
        .unwrap();

    let expected: LinkedList<Data> = [("C", 3), ("D", 4)]
        .into_iter()
        .map(|(text, n)| Data {
            text: text.to_string(),
            n,
        })
        .collect();
    assert_eq!(records, expected);
    assert_eq!(
        in_out,
        vec![
            ("A".to_string(), 1),
            ("B".to_string(), 2),
            ("C".to_string(), 3),
            ("D".to_string(), 4),
        ]
    );
}

#[test]
fn test_abc_void_call() {
    let mut transport = demo_transport();
    api::abc::call().sync(&mut transport).unwrap();
    assert!(demo::abc_called());
}

// =============================================================================
// Output ordering
// =============================================================================

ipc_call::remote! {
    fn scramble(a: &mut u8, skip: u64, b: &mut String, c: &u16, d: &mut Vec<u32>) -> i64;
}

#[allow(clippy::ptr_arg)]
fn scramble_impl(a: &mut u8, skip: u64, b: &mut String, c: &u16, d: &mut Vec<u32>) -> i64 {
    *a += 1;
    b.push_str("!");
    d.push(u32::from(*c));
    -(skip as i64)
}

#[test]
fn test_mixed_outputs_of_different_sizes() {
    let mut registry = Registry::new();
    registry.register::<scramble, _>(scramble_impl);
    let mut transport = Loopback::new(Dispatcher::new(registry));

    let (mut a, mut b, mut d) = (9u8, String::from("hi"), vec![1u32]);
    let ret = scramble::call(&mut a, 5, &mut b, &300, &mut d)
        .sync(&mut transport)
        .unwrap();

    assert_eq!(ret, -5);
    assert_eq!(a, 10);
    assert_eq!(b, "hi!");
    assert_eq!(d, vec![1, 300]);
}

#[test]
fn test_response_lists_outputs_in_reverse() {
    let dispatcher = Dispatcher::new(demo::registry());
    let request = api::swap::call(&mut 1, &mut 2).request().unwrap();

    // After swapping: a = 2, b = 1. Response is b then a.
    let response = dispatcher.handle_sync_request(&request).unwrap();
    assert_eq!(response, [1, 0, 0, 0, 2, 0, 0, 0]);
}

#[test]
fn test_void_response_holds_only_outputs() {
    let dispatcher = Dispatcher::new(demo::registry());
    let mut target = Vec::new();
    let request = api::append_all::call(&vec!["z".to_string()], &mut target).request().unwrap();

    let response = dispatcher.handle_sync_request(&request).unwrap();
    assert_eq!(response, codec::to_bytes(&vec!["z".to_string()]).unwrap());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_transport_error_propagates_and_leaves_args() {
    let mut transport = |_: &[u8]| -> Result<Vec<u8>, TransportError> { Err(TransportError::Closed) };
    let (mut a, mut b) = (1, 2);

    let result = api::swap::call(&mut a, &mut b).sync(&mut transport);

    assert!(matches!(result, Err(TransportError::Closed)));
    assert_eq!((a, b), (1, 2));
}

#[test]
fn test_unregistered_function_surfaces_dispatch_error() {
    let mut transport = Loopback::new(Dispatcher::new(Registry::new()));

    let err = api::sum::call(1, 1).sync(&mut transport).unwrap_err();

    match err {
        TransportError::Dispatch(DispatchError::NotRegistered { name }) => assert_eq!(name, "sum"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_short_response_is_decode_error() {
    let mut transport = |_: &[u8]| -> Result<Vec<u8>, TransportError> { Ok(vec![7, 0]) };

    let result = api::sum::call(3, 4).sync(&mut transport);

    assert!(matches!(
        result,
        Err(TransportError::Decode(DecodeError::UnexpectedEof))
    ));
}

#[test]
fn test_truncated_response_leaves_outputs_untouched() {
    // `b` decodes, `a` is missing entirely.
    let mut transport = |_: &[u8]| -> Result<Vec<u8>, TransportError> { Ok(vec![9, 0, 0, 0]) };
    let (mut a, mut b) = (1, 2);

    let result = api::swap::call(&mut a, &mut b).sync(&mut transport);

    assert!(matches!(
        result,
        Err(TransportError::Decode(DecodeError::UnexpectedEof))
    ));
    assert_eq!((a, b), (1, 2));
}

#[test]
fn test_trailing_response_leaves_outputs_untouched() {
    let mut transport =
        |_: &[u8]| -> Result<Vec<u8>, TransportError> { Ok(vec![9, 0, 0, 0, 8, 0, 0, 0, 0]) };
    let (mut a, mut b) = (1, 2);

    let result = api::swap::call(&mut a, &mut b).sync(&mut transport);

    assert!(matches!(
        result,
        Err(TransportError::Decode(DecodeError::TrailingBytes(1)))
    ));
    assert_eq!((a, b), (1, 2));
}

#[test]
fn test_trailing_response_is_decode_error() {
    let mut transport = |_: &[u8]| -> Result<Vec<u8>, TransportError> { Ok(vec![7, 0, 0, 0, 0]) };

    let result = api::sum::call(3, 4).sync(&mut transport);

    assert!(matches!(
        result,
        Err(TransportError::Decode(DecodeError::TrailingBytes(1)))
    ));
}

#[test]
fn test_post_discards_results() {
    let mut transport = demo_transport();
    let before = demo::notifications();

    api::notify::call("ping".to_string())
        .post(&mut transport)
        .unwrap();

    assert!(demo::notifications() > before);
}
