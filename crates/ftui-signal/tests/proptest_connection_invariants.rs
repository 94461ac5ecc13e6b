//! Property-based invariant tests for the connection list.
//!
//! A plain `Vec` model mirrors every operation; after each step the real
//! signal must agree with it:
//!
//! 1. `count_connections` equals the model length.
//! 2. Every receiver's binding count equals its entries in the model.
//! 3. Emission visits receivers in model order.
//! 4. Disconnect returns the number of entries the model removed.
//! 5. Dropping a receiver removes exactly its entries.
//! 6. Self-unbinding receivers run once in the pass that unbinds them.
//! 7. Forwarding is refused exactly when it would close a cycle.

use std::rc::Rc;

use ftui_signal::{Observer, Signal, SignalError};
use ftui_signal_harness::{InvocationLog, Recorder};
use proptest::prelude::*;

const RECEIVERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    receiver: usize,
    alt: bool,
}

impl Entry {
    fn label(self) -> String {
        if self.alt {
            format!("r{}:alt", self.receiver)
        } else {
            format!("r{}", self.receiver)
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Connect { receiver: usize, alt: bool, index: isize },
    Disconnect { receiver: usize, alt: bool, start: isize, count: isize },
    DisconnectRange { start: isize, count: isize },
    DropReceiver { receiver: usize },
    UnbindAll { receiver: usize },
    Emit,
}

// ── Model ─────────────────────────────────────────────────────────────────

fn model_insert(model: &mut Vec<Entry>, index: isize, entry: Entry) {
    let len = model.len() as isize;
    let pos = if index >= 0 {
        index.min(len)
    } else {
        let anchor = len + index;
        if anchor < 0 { 0 } else { anchor + 1 }
    };
    model.insert(pos as usize, entry);
}

fn model_disconnect(
    model: &mut Vec<Entry>,
    matches: impl Fn(&Entry) -> bool,
    start: isize,
    count: isize,
) -> usize {
    if count == 0 {
        return 0;
    }
    let len = model.len() as isize;
    let order: Vec<usize> = if start >= 0 {
        (start.min(len) as usize..len as usize).collect()
    } else {
        let from = len + start;
        if from < 0 {
            Vec::new()
        } else {
            (0..=from as usize).rev().collect()
        }
    };
    let mut chosen = Vec::new();
    for i in order {
        if matches(&model[i]) {
            chosen.push(i);
            if count > 0 && chosen.len() as isize == count {
                break;
            }
        }
    }
    chosen.sort_unstable();
    for i in chosen.iter().rev() {
        model.remove(*i);
    }
    chosen.len()
}

fn reaches(edges: &[(usize, usize)], from: usize, goal: usize) -> bool {
    let mut stack = vec![from];
    let mut seen = [false; RECEIVERS];
    while let Some(node) = stack.pop() {
        if node == goal {
            return true;
        }
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        stack.extend(edges.iter().filter(|(a, _)| *a == node).map(|(_, b)| *b));
    }
    false
}

// ── Strategies ────────────────────────────────────────────────────────────

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..RECEIVERS, any::<bool>(), -6isize..6)
            .prop_map(|(receiver, alt, index)| Op::Connect { receiver, alt, index }),
        2 => (0..RECEIVERS, any::<bool>(), -6isize..6, -2isize..3).prop_map(
            |(receiver, alt, start, count)| Op::Disconnect { receiver, alt, start, count }
        ),
        1 => (-6isize..6, -2isize..3)
            .prop_map(|(start, count)| Op::DisconnectRange { start, count }),
        1 => (0..RECEIVERS).prop_map(|receiver| Op::DropReceiver { receiver }),
        1 => (0..RECEIVERS).prop_map(|receiver| Op::UnbindAll { receiver }),
        2 => Just(Op::Emit),
    ]
}

fn connect_at(signal: &Signal<i32>, receiver: &Rc<Recorder>, alt: bool, index: isize) {
    if alt {
        signal.connect_at(receiver, Recorder::on_alt, index);
    } else {
        signal.connect_at(receiver, Recorder::on_value, index);
    }
}

fn disconnect(
    signal: &Signal<i32>,
    receiver: &Rc<Recorder>,
    alt: bool,
    start: isize,
    count: isize,
) -> usize {
    if alt {
        signal.disconnect(receiver, Recorder::on_alt, start, count)
    } else {
        signal.disconnect(receiver, Recorder::on_value, start, count)
    }
}

fn recorders(log: &InvocationLog) -> Vec<Rc<Recorder>> {
    (0..RECEIVERS)
        .map(|i| Recorder::new(format!("r{i}"), log))
        .collect()
}

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn signal_matches_vec_model(ops in prop::collection::vec(op_strategy(), 1..48)) {
        let log = InvocationLog::new();
        let signal = Signal::<i32>::new();
        let mut receivers = recorders(&log);
        let mut model: Vec<Entry> = Vec::new();

        for op in ops {
            match op {
                Op::Connect { receiver, alt, index } => {
                    connect_at(&signal, &receivers[receiver], alt, index);
                    model_insert(&mut model, index, Entry { receiver, alt });
                }
                Op::Disconnect { receiver, alt, start, count } => {
                    let removed = disconnect(&signal, &receivers[receiver], alt, start, count);
                    let expected = model_disconnect(
                        &mut model,
                        |e| *e == Entry { receiver, alt },
                        start,
                        count,
                    );
                    prop_assert_eq!(removed, expected);
                }
                Op::DisconnectRange { start, count } => {
                    let removed = signal.disconnect_range(start, count);
                    prop_assert_eq!(removed, model_disconnect(&mut model, |_| true, start, count));
                }
                Op::DropReceiver { receiver } => {
                    receivers[receiver] = Recorder::new(format!("r{receiver}"), &log);
                    model.retain(|e| e.receiver != receiver);
                }
                Op::UnbindAll { receiver } => {
                    let removed = receivers[receiver].trackable().unbind_all();
                    let before = model.len();
                    model.retain(|e| e.receiver != receiver);
                    prop_assert_eq!(removed, before - model.len());
                }
                Op::Emit => {
                    log.clear();
                    signal.emit(&0);
                    let expected: Vec<String> = model.iter().map(|e| e.label()).collect();
                    prop_assert_eq!(log.names(), expected);
                }
            }

            prop_assert_eq!(signal.count_connections(), model.len());
            for (i, r) in receivers.iter().enumerate() {
                let expected = model.iter().filter(|e| e.receiver == i).count();
                prop_assert_eq!(r.trackable().count_bindings(), expected);
                prop_assert_eq!(signal.is_connected_to_trackable(r.trackable()), expected > 0);
            }
        }
    }

    #[test]
    fn self_unbind_runs_each_connection_once(flags in prop::collection::vec(any::<bool>(), 1..12)) {
        let log = InvocationLog::new();
        let signal = Signal::<i32>::new();
        let receivers: Vec<_> = (0..flags.len())
            .map(|i| Recorder::new(format!("r{i}"), &log))
            .collect();
        for (r, leaves) in receivers.iter().zip(&flags) {
            if *leaves {
                signal.connect(r, Recorder::on_unbind_self);
            } else {
                signal.connect(r, Recorder::on_value);
            }
        }

        signal.emit(&1);
        let all: Vec<String> = receivers.iter().map(|r| r.name().to_string()).collect();
        prop_assert_eq!(log.names(), all);

        log.clear();
        signal.emit(&2);
        let stayed: Vec<String> = receivers
            .iter()
            .zip(&flags)
            .filter(|(_, leaves)| !**leaves)
            .map(|(r, _)| r.name().to_string())
            .collect();
        prop_assert_eq!(signal.count_connections(), stayed.len());
        prop_assert_eq!(log.names(), stayed);
    }

    #[test]
    fn forwarding_refused_only_on_cycles(
        edges in prop::collection::vec((0..RECEIVERS, 0..RECEIVERS), 0..16)
    ) {
        let signals: Vec<Signal<i32>> = (0..RECEIVERS).map(|_| Signal::new()).collect();
        let mut accepted: Vec<(usize, usize)> = Vec::new();

        for (from, to) in edges {
            let result = signals[from].connect_signal(&signals[to]);
            if reaches(&accepted, to, from) {
                prop_assert_eq!(result, Err(SignalError::ForwardCycle));
            } else {
                prop_assert_eq!(result, Ok(()));
                accepted.push((from, to));
            }
        }

        for (i, signal) in signals.iter().enumerate() {
            let inbound = accepted.iter().filter(|(_, to)| *to == i).count();
            prop_assert_eq!(signal.count_bindings(), inbound);
        }
        // Acyclic graphs always terminate.
        signals[0].emit(&0);
    }
}
