//! Property-based tests for describing value graphs

use std::collections::BTreeSet;
use std::sync::Arc;

use describe_rs::{Describer, Field, HookRegistry, Slot, Type, Value};
use proptest::prelude::*;

/// A describer without any hooks, so every node renders structurally.
fn plain() -> Describer {
    Describer::new().with_registry(Arc::new(HookRegistry::new()))
}

// Strategy for acyclic values with no shared storage
fn any_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Invalid),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u8>().prop_map(Value::from),
        "[a-z0-9]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|items| Value::slice(Type::ANY, items.into_iter().map(Value::interface))),
            inner.clone().prop_map(Value::boxed),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|fields| {
                let fields = fields.into_iter().map(|(name, value)| Field::new(name, value));
                Value::structure("S", fields)
            }),
        ]
    })
}

/// `edges[i]` lists the slots node `i` points at; indices wrap around.
fn any_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..7).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 0..3), n)
    })
}

/// Slots holding `N<id=i e0=*.. e1=*..>` with the given edges. Returns the
/// slots (kept alive by the caller) and a pointer to slot 0.
fn build_graph(edges: &[Vec<usize>]) -> (Vec<Slot>, Value) {
    let slots: Vec<Slot> = edges.iter().map(|_| Slot::new(Value::Invalid)).collect();
    for (i, targets) in edges.iter().enumerate() {
        let mut fields = vec![Field::new("id", i as i64)];
        for (j, &t) in targets.iter().enumerate() {
            let edge = Value::pointer(Type::structure("N"), &slots[t]);
            fields.push(Field::new(format!("e{j}"), edge));
        }
        slots[i].set(Value::structure("N", fields));
    }
    let root = Value::pointer(Type::structure("N"), &slots[0]);
    (slots, root)
}

fn reachable(edges: &[Vec<usize>]) -> usize {
    let mut seen = BTreeSet::from([0]);
    let mut stack = vec![0];
    while let Some(i) = stack.pop() {
        for &t in &edges[i] {
            if seen.insert(t) {
                stack.push(t);
            }
        }
    }
    seen.len()
}

/// Label definitions (`n~`) and back-references (`$n`) in output order.
#[derive(Debug, PartialEq)]
enum Mark {
    Def(usize),
    Ref(usize),
}

fn marks(out: &str) -> Vec<Mark> {
    let bytes = out.as_bytes();
    let mut marks = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            marks.push(Mark::Ref(out[start..end].parse().unwrap()));
            i = end;
        } else if bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()) {
            let mut end = i;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end < bytes.len() && bytes[end] == b'~' {
                marks.push(Mark::Def(out[i..end].parse().unwrap()));
            }
            i = end;
        } else {
            i += 1;
        }
    }
    marks
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<String>().replace('=', "")
}

// ===== TREES =====

proptest! {
    #[test]
    fn tree_description_is_deterministic(v in any_tree()) {
        let d = plain();
        prop_assert_eq!(d.describe(&v), d.describe(&v));
    }

    #[test]
    fn tree_has_no_labels(v in any_tree()) {
        let out = plain().describe(&v);
        prop_assert!(!out.contains('~'), "{}", out);
        prop_assert!(!out.contains('$'), "{}", out);
    }

    #[test]
    fn multiline_matches_compact(v in any_tree(), step in 1usize..8) {
        let compact = plain().describe(&v);
        let multiline = plain().with_indent_step(step).describe(&v);
        prop_assert_eq!(squash(&compact), squash(&multiline));
    }
}

// ===== GRAPHS WITH SHARING AND CYCLES =====

proptest! {
    #[test]
    fn graph_labels_are_well_formed(edges in any_graph()) {
        let (_slots, root) = build_graph(&edges);
        let out = plain().describe(&root);

        let mut defined = Vec::new();
        let mut referenced = BTreeSet::new();
        for mark in marks(&out) {
            match mark {
                Mark::Def(n) => {
                    // Labels are contiguous from 1 and first shown in order.
                    prop_assert_eq!(n, defined.len() + 1, "{}", out);
                    defined.push(n);
                }
                Mark::Ref(n) => {
                    prop_assert!(defined.contains(&n), "${} before {}~ in {}", n, n, out);
                    referenced.insert(n);
                }
            }
        }
        // A label exists only because its node is reached again.
        prop_assert_eq!(referenced.len(), defined.len(), "{}", out);
    }

    #[test]
    fn graph_nodes_rendered_once(edges in any_graph()) {
        let (_slots, root) = build_graph(&edges);
        let out = plain().describe(&root);
        prop_assert_eq!(out.matches("N<").count(), reachable(&edges), "{}", out);
    }

    #[test]
    fn graph_description_is_deterministic(edges in any_graph()) {
        let (_slots, root) = build_graph(&edges);
        let d = plain();
        prop_assert_eq!(d.describe(&root), d.describe(&root));
    }
}
