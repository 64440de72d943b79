//! End-to-end tests for custom hooks through the process-wide registry.
//!
//! Tests run in parallel against the same registry, so each one uses its own
//! type names.

use std::sync::Arc;
use std::thread;

use describe_rs::hooks::{self, hook, HookRegistry};
use describe_rs::{d, register_hook, Describer, Field, HookError, Shared, Type, Value};
use pretty_assertions::assert_eq;

fn url(href: &str) -> Value {
    Value::structure("UrlE2e", [Field::new("href", href)])
}

fn describe_url(v: &Value) -> Result<String, HookError> {
    let href = v
        .as_struct()
        .and_then(|s| s.field("href"))
        .and_then(Value::as_str)
        .ok_or_else(|| HookError::Mismatch {
            expected: "UrlE2e".into(),
            got: v.type_of().to_string(),
        })?;
    Ok(format!("url<{href}>"))
}

#[test]
fn test_register_replace_remove() {
    let ty = Type::structure("UrlE2e");
    let v = Value::boxed(url("http://example.com"));
    assert_eq!(d(&v), r#"*UrlE2e<href="http://example.com">"#);

    assert!(register_hook(ty.clone(), Some(hook(describe_url))).is_none());
    assert_eq!(d(&v), "*url<http://example.com>");

    let previous = register_hook(ty.clone(), Some(hook(|_| Ok("link<>".into()))));
    assert!(previous.is_some());
    assert_eq!(d(&v), "*link<>");

    assert!(register_hook(ty.clone(), None).is_some());
    assert_eq!(d(&v), r#"*UrlE2e<href="http://example.com">"#);
    assert!(register_hook(ty, None).is_none());
}

#[test]
fn test_hook_matches_exact_type_only() {
    // A hook on the struct does not fire for the pointer, only for the
    // pointed-to value.
    let ty = Type::structure("ExactE2e");
    register_hook(ty.clone(), Some(hook(|_| Ok("exact<>".into()))));
    let item = Value::boxed(Value::structure("ExactE2e", []));
    let v = Value::slice(Type::pointer(ty.clone()), [item]);
    assert_eq!(d(&v), "*ExactE2e[*exact<>]");
    register_hook(ty, None);
}

#[test]
fn test_timestamp_builtin() {
    use chrono::{TimeZone, Utc};
    let at = Utc.with_ymd_and_hms(2021, 6, 15, 12, 30, 0).unwrap();
    let v = Value::structure("Event", [Field::new("at", at)]);
    assert_eq!(d(&v), "Event<at=time<2021-06-15 12:30:00 UTC>>");
}

#[test]
fn test_hook_errors_stay_local() {
    let ty = Type::structure("FlakyE2e");
    register_hook(ty.clone(), Some(hook(|_| Err(HookError::Failed("backend down".into())))));
    let v = Value::structure("Pair", [
        Field::new("a", Value::structure("FlakyE2e", [])),
        Field::new("b", 2i64),
    ]);
    assert_eq!(d(&v), "Pair<a=<hook failed: backend down> b=2>");
    register_hook(ty, None);
}

#[test]
fn test_hook_may_describe_recursively() {
    // A hook that itself calls the describer on a part of the value.
    let ty = Type::structure("WrapperE2e");
    register_hook(ty.clone(), Some(hook(|v| {
        let inner = v.as_struct().and_then(|s| s.field("inner")).cloned().unwrap_or_default();
        Ok(format!("wrap<{}>", d(&inner)))
    })));
    let bytes = Value::slice(Type::U8, [Value::from(1u8)]);
    let v = Value::structure("WrapperE2e", [Field::new("inner", bytes)]);
    assert_eq!(d(&v), "wrap<u8[0x01]>");
    register_hook(ty, None);
}

#[test]
fn test_hook_may_register_hooks() {
    // Hooks run without the registry lock held.
    let ty = Type::structure("RegistrarE2e");
    let other = Type::structure("RegisteredE2e");
    let other_in_hook = other.clone();
    register_hook(ty.clone(), Some(hook(move |_| {
        register_hook(other_in_hook.clone(), Some(hook(|_| Ok("late<>".into()))));
        Ok("registrar<>".into())
    })));
    assert_eq!(d(&Value::structure("RegistrarE2e", [])), "registrar<>");
    assert_eq!(d(&Value::structure("RegisteredE2e", [])), "late<>");
    register_hook(ty, None);
    register_hook(other, None);
}

#[test]
fn test_concurrent_register_while_describing() {
    let ty = Type::structure("RacyE2e");
    let storage = Shared::new(
        (0..64i64)
            .map(|i| Value::structure("RacyE2e", [Field::new("i", i)]))
            .collect::<Vec<_>>(),
    );
    let v = Value::slice_of(ty.clone(), &storage);

    let describers: Vec<_> = (0..4)
        .map(|_| {
            let v = v.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let out = d(&v);
                    assert!(out.starts_with("RacyE2e["), "{out}");
                    // Every element renders either by default or by the hook.
                    let hooked = out.matches("racy<>").count();
                    let plain = out.matches("RacyE2e<").count();
                    assert_eq!(hooked + plain, 64, "{out}");
                }
            })
        })
        .collect();

    let registrar = {
        let ty = ty.clone();
        thread::spawn(move || {
            for i in 0..200 {
                let h = (i % 2 == 0).then(|| hook(|_| Ok("racy<>".into())));
                register_hook(ty.clone(), h);
            }
        })
    };

    for t in describers {
        t.join().unwrap();
    }
    registrar.join().unwrap();
    register_hook(ty, None);
}

#[test]
fn test_injected_registry_is_isolated() {
    let ty = Type::structure("IsolatedE2e");
    let registry = Arc::new(HookRegistry::new());
    registry.register(ty.clone(), Some(hook(|_| Ok("isolated<>".into()))));

    let v = Value::structure("IsolatedE2e", []);
    let describer = Describer::new().with_registry(Arc::clone(&registry));
    assert_eq!(describer.describe(&v), "isolated<>");
    assert_eq!(d(&v), "IsolatedE2e<>");
    assert!(!hooks::global().contains(&ty));
}
