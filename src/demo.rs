//! Built-in demo functions.
//!
//! `ipc-call serve` exposes these, and `ipc-call demo` calls each one
//! through a real transport and prints what came back.

use std::collections::{BTreeMap, LinkedList};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::Registry;
use crate::transport::{OneWayTransport, Transport, TransportError};

/// A user-defined record. On the wire: `text` then `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub text: String,
    pub n: i32,
}

/// Client-side declarations of the demo functions.
pub mod api {
    use super::Data;
    use std::collections::{BTreeMap, LinkedList};

    crate::remote! {
        /// Set the server's "called" flag.
        pub fn abc();

        /// Append every entry of `input` to `in_out` and return them as
        /// records.
        pub fn xyz(input: &BTreeMap<String, i32>, in_out: &mut Vec<(String, i32)>) -> LinkedList<Data>;

        /// Wrapping sum.
        pub fn sum(a: i32, b: i32) -> i32;

        pub fn append_all(items: &Vec<String>, target: &mut Vec<String>);

        pub fn swap(a: &mut i32, b: &mut i32);

        /// Count a notification; meant to be posted.
        pub fn notify(message: String);
    }
}

static ABC_CALLED: AtomicBool = AtomicBool::new(false);
static NOTIFICATIONS: AtomicUsize = AtomicUsize::new(0);

/// Whether `abc` has run in this process.
pub fn abc_called() -> bool {
    ABC_CALLED.load(Ordering::SeqCst)
}

/// How many `notify` calls this process has served.
pub fn notifications() -> usize {
    NOTIFICATIONS.load(Ordering::SeqCst)
}

fn abc() {
    ABC_CALLED.store(true, Ordering::SeqCst);
}

#[allow(clippy::ptr_arg)]
fn xyz(input: &BTreeMap<String, i32>, in_out: &mut Vec<(String, i32)>) -> LinkedList<Data> {
    let mut records = LinkedList::new();
    for (key, value) in input {
        in_out.push((key.clone(), *value));
        records.push_back(Data {
            text: key.clone(),
            n: *value,
        });
    }
    records
}

fn sum(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

#[allow(clippy::ptr_arg)]
fn append_all(items: &Vec<String>, target: &mut Vec<String>) {
    target.extend(items.iter().cloned());
}

fn swap(a: &mut i32, b: &mut i32) {
    std::mem::swap(a, b);
}

fn notify(message: String) {
    let count = NOTIFICATIONS.fetch_add(1, Ordering::SeqCst) + 1;
    info!(%message, count, "notification received");
}

/// A registry holding every demo function.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register::<api::abc, _>(abc);
    registry.register::<api::xyz, _>(xyz);
    registry.register::<api::sum, _>(sum);
    registry.register::<api::append_all, _>(append_all);
    registry.register::<api::swap, _>(swap);
    registry.register::<api::notify, _>(notify);
    registry
}

/// Call every demo function through `transport`, returning one report line
/// per call.
pub fn run<T>(transport: &mut T) -> Result<Vec<String>, TransportError>
where
    T: Transport<Error = TransportError> + OneWayTransport<Error = TransportError>,
{
    let mut report = Vec::new();

    api::abc::call().sync(transport)?;
    report.push("abc() -> ()".to_string());

    let input = BTreeMap::from([("C".to_string(), 3), ("D".to_string(), 4)]);
    let mut pairs = vec![("A".to_string(), 1), ("B".to_string(), 2)];
    let records = api::xyz::call(&input, &mut pairs).sync(transport)?;
    report.push(format!("xyz({input:?}) -> {records:?}, in_out = {pairs:?}"));

    let total = api::sum::call(3, 4).sync(transport)?;
    report.push(format!("sum(3, 4) -> {total}"));

    let items = vec!["x".to_string(), "y".to_string()];
    let mut target = vec!["w".to_string()];
    api::append_all::call(&items, &mut target).sync(transport)?;
    report.push(format!("append_all({items:?}) -> target = {target:?}"));

    let (mut a, mut b) = (1, 2);
    api::swap::call(&mut a, &mut b).sync(transport)?;
    report.push(format!("swap(1, 2) -> a = {a}, b = {b}"));

    api::notify::call("demo finished".to_string()).post(transport)?;
    report.push("notify(\"demo finished\") posted".to_string());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Dispatcher;
    use crate::transport::Loopback;

    #[test]
    fn test_registry_holds_every_demo_function() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec!["abc", "append_all", "notify", "sum", "swap", "xyz"]
        );
    }

    #[test]
    fn test_run_over_loopback() {
        let mut transport = Loopback::new(Dispatcher::new(registry()));
        let before = notifications();

        let report = run(&mut transport).unwrap();

        assert_eq!(report.len(), 6);
        assert!(abc_called());
        assert!(notifications() > before);
        assert_eq!(report[2], "sum(3, 4) -> 7");
        assert_eq!(report[4], "swap(1, 2) -> a = 2, b = 1");
        assert!(report[1].ends_with(
            r#"in_out = [("A", 1), ("B", 2), ("C", 3), ("D", 4)]"#
        ));
    }

    #[test]
    fn test_sum_wraps() {
        assert_eq!(sum(i32::MAX, 1), i32::MIN);
    }
}
