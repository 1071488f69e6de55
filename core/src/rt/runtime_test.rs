use std::sync::Arc;

use crate::error::RuntimeError;
use crate::ns::{Callable, PackageDef};
use crate::val::ValueCell;

use super::builtins;
use super::console::BufferConsole;
use super::runtime::{CallFrame, CallKind, Runtime};

fn const_int(v: i64) -> Callable {
    Arc::new(move |_rt: &mut Runtime, _frame: &CallFrame, _args: &mut [ValueCell]| {
        Ok(Some(ValueCell::from_int(v)))
    })
}

/// Delegates to the parent binding of `func_name` and adds `n` — the shape
/// every package override in the package-chain scripts uses.
fn parent_plus(func_name: &'static str, n: i64) -> Callable {
    Arc::new(move |rt: &mut Runtime, frame: &CallFrame, _args: &mut [ValueCell]| {
        let parent = rt.invoke_in(Some(frame), CallKind::Parent, "", func_name, &[])?;
        let value = parent.map_or(0, |cell| cell.int_value(&rt.objects));
        Ok(Some(ValueCell::from_int(value + n)))
    })
}

fn int_result(rt: &mut Runtime, kind: CallKind, receiver: &str, func: &str, args: &[&str]) -> i64 {
    rt.invoke(kind, receiver, func, args)
        .unwrap()
        .map_or(0, |cell| cell.int_value(&rt.objects))
}

#[test]
fn plain_call_resolves_in_the_global_namespace() {
    let mut rt = Runtime::new();
    rt.bind_base("", "getNumber", const_int(1));
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 1);
}

#[test]
fn plain_call_accepts_an_explicit_namespace() {
    let mut rt = Runtime::new();
    rt.bind_base("namespaced", "getNumber", const_int(2));
    assert_eq!(int_result(&mut rt, CallKind::Plain, "namespaced", "getNumber", &[]), 2);
}

#[test]
fn package_chain_overrides_and_parent_calls() {
    let mut rt = Runtime::new();
    rt.bind_base("", "getNumber", const_int(1));
    rt.bind_base("namespaced", "getNumber", const_int(2));

    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 1);
    assert_eq!(int_result(&mut rt, CallKind::Plain, "namespaced", "getNumber", &[]), 2);

    rt.activate_package(
        PackageDef::new("a")
            .bind("", "getNumber", parent_plus("getNumber", 1))
            .bind("namespaced", "getNumber", parent_plus("getNumber", 2)),
    )
    .unwrap();
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 2);
    assert_eq!(int_result(&mut rt, CallKind::Plain, "namespaced", "getNumber", &[]), 4);

    rt.activate_package(
        PackageDef::new("b")
            .bind("", "getNumber", parent_plus("getNumber", 1))
            .bind("namespaced", "getNumber", parent_plus("getNumber", 2)),
    )
    .unwrap();
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 3);
    assert_eq!(int_result(&mut rt, CallKind::Plain, "namespaced", "getNumber", &[]), 6);

    // LIFO teardown restores each step.
    rt.deactivate_package("b").unwrap();
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 2);
    assert_eq!(rt.deactivate_top_package().unwrap(), "a");
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 1);
}

#[test]
fn intermediate_package_without_override_is_skipped() {
    let mut rt = Runtime::new();
    rt.bind_base("", "getNumber", const_int(1));
    rt.activate_package(PackageDef::new("a").bind("", "getNumber", parent_plus("getNumber", 1)))
        .unwrap();
    rt.activate_package(PackageDef::new("quiet").bind("other", "unrelated", const_int(0)))
        .unwrap();

    // "quiet" pushed nothing onto the global namespace: direct calls still
    // reach "a", whose parent call still reaches base.
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 2);
}

#[test]
fn method_call_resolves_receiver_by_name_and_by_identity() {
    let mut rt = Runtime::new();
    rt.bind_base(
        "FileObject",
        "boundFunction",
        Arc::new(|rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]| {
            let this = args[0].int_value(&rt.objects);
            let a = args[1].int_value(&rt.objects);
            let b = args[2].int_value(&rt.objects);
            let c = args[3].int_value(&rt.objects);
            Ok(Some(ValueCell::from_int(this + a + b * c)))
        }),
    );
    let id = rt.objects.create_object("FileObject", "Test", None, Vec::new());

    let by_name = int_result(&mut rt, CallKind::Method, "Test", "boundFunction", &["1", "2", "3"]);
    assert_eq!(by_name, id + 1 + 2 * 3);

    let id_text = id.to_string();
    let by_id = int_result(&mut rt, CallKind::Method, &id_text, "boundFunction", &["1", "2", "3"]);
    assert_eq!(by_id, by_name);
}

#[test]
fn arguments_marshal_as_text_and_coerce_on_demand() {
    let mut rt = Runtime::new();
    rt.bind_base(
        "",
        "sum",
        Arc::new(|rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]| {
            let total: f64 = args.iter().map(|cell| cell.float_value(&rt.objects)).sum();
            Ok(Some(ValueCell::from_float(total)))
        }),
    );
    let out = rt
        .invoke(CallKind::Plain, "", "sum", &["1", "2.5", "junk"])
        .unwrap()
        .unwrap();
    assert_eq!(out.float_value(&crate::val::NoIdentities), 3.5);
}

#[test]
fn chained_field_and_array_access_reaches_the_leaf_object() {
    let mut rt = Runtime::new();
    let a = rt.objects.create_object("FileObject", "A", None, Vec::new());
    let b = rt.objects.create_object("FileObject", "B", None, Vec::new());
    let c = rt.objects.create_object("FileObject", "C", None, Vec::new());

    // A.field = B (by name); B.field[1,2,3] = C (by identity).
    rt.objects.set_field(a, "field", ValueCell::from_text("B"));
    rt.objects.set_array_field(b, "field", &["1", "2", "3"], ValueCell::from_int(c));

    let mid = rt.objects.field(a, "field").unwrap().int_value(&rt.objects);
    assert_eq!(mid, b);
    let leaf = rt
        .objects
        .array_field(mid, "field", &["1", "2", "3"])
        .unwrap()
        .int_value(&rt.objects);
    assert_eq!(leaf, c);
}

#[test]
fn echo_emits_one_complete_line() {
    let console = BufferConsole::new();
    let mut rt = Runtime::with_console(Box::new(console.clone()));
    rt.invoke(CallKind::Plain, "", "echo", &["GOT VALUE: ", "55"]).unwrap();
    assert_eq!(console.lines(), vec!["GOT VALUE: 55"]);
}

#[test]
fn group_builtins_reproduce_sim_group_counts() {
    let mut rt = Runtime::new();
    builtins::install_object_builtins(&mut rt, "SimGroup");
    rt.objects.create_object("SimGroup", "Root1", None, Vec::new());
    rt.objects.create_object("SimGroup", "Root2", None, Vec::new());
    rt.objects.create_object("SimGroup", "Inner", None, Vec::new());

    assert_eq!(int_result(&mut rt, CallKind::Method, "Root1", "getCount", &[]), 0);
    assert_eq!(int_result(&mut rt, CallKind::Method, "Root2", "getCount", &[]), 0);

    rt.invoke(CallKind::Method, "Root1", "add", &["Inner"]).unwrap();
    assert_eq!(int_result(&mut rt, CallKind::Method, "Root1", "getCount", &[]), 1);
    assert_eq!(int_result(&mut rt, CallKind::Method, "Root2", "getCount", &[]), 0);

    rt.invoke(CallKind::Method, "Root2", "add", &["Inner"]).unwrap();
    assert_eq!(int_result(&mut rt, CallKind::Method, "Root1", "getCount", &[]), 1);
    assert_eq!(int_result(&mut rt, CallKind::Method, "Root2", "getCount", &[]), 1);
}

#[test]
fn get_object_and_get_name_walk_the_tree() {
    let mut rt = Runtime::new();
    builtins::install_object_builtins(&mut rt, "SimSet");
    rt.objects.create_object("SimSet", "Root", None, Vec::new());
    rt.objects.create_object("SimSet", "ChildRoot", None, Vec::new());
    rt.invoke(CallKind::Method, "Root", "add", &["ChildRoot"]).unwrap();

    let child = rt
        .invoke(CallKind::Method, "Root", "getObject", &["0"])
        .unwrap()
        .unwrap();
    let child_text = child.text_value().into_owned();
    let name = rt
        .invoke(CallKind::Method, &child_text, "getName", &[])
        .unwrap()
        .unwrap();
    assert_eq!(name.text_value(), "ChildRoot");
}

#[test]
fn resolution_failures_are_named_and_recoverable() {
    let mut rt = Runtime::new();
    rt.bind_base("", "getNumber", const_int(1));

    let err = rt.invoke(CallKind::Plain, "", "missing", &[]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RuntimeError>(),
        Some(&RuntimeError::UnknownFunction {
            namespace: String::new(),
            function: "missing".to_string(),
        })
    );

    let err = rt.invoke(CallKind::Plain, "NoSuchClass", "f", &[]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RuntimeError>(),
        Some(&RuntimeError::UnknownNamespace("nosuchclass".to_string()))
    );

    let err = rt.invoke(CallKind::Method, "ghost", "f", &[]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RuntimeError>(),
        Some(&RuntimeError::UnknownReceiver("ghost".to_string()))
    );

    let err = rt.invoke(CallKind::Parent, "", "getNumber", &[]).unwrap_err();
    assert_eq!(err.downcast_ref::<RuntimeError>(), Some(&RuntimeError::ParentCallWithoutContext));

    // The runtime is still usable after every abandoned call.
    assert_eq!(int_result(&mut rt, CallKind::Plain, "", "getNumber", &[]), 1);
}

#[test]
fn independent_runtimes_do_not_share_state() {
    let mut first = Runtime::new();
    let mut second = Runtime::new();
    first.bind_base("", "getNumber", const_int(1));

    assert_eq!(int_result(&mut first, CallKind::Plain, "", "getNumber", &[]), 1);
    assert!(second.invoke(CallKind::Plain, "", "getNumber", &[]).is_err());

    first.objects.create_object("FileObject", "Solo", None, Vec::new());
    assert!(second.objects.find_by_name("Solo").is_none());
}
