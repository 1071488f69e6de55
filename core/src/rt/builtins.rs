//! Built-in functions bound into the base layers.
//!
//! `echo` is always present. The object-tree surface (`getName`, `getId`,
//! `add`, `getCount`, `getObject`) is installed per engine class by the
//! host, since method resolution is name-based with no inheritance chain.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::error::RuntimeError;
use crate::ns::GLOBAL_NS;
use crate::obj::ObjectId;
use crate::val::ValueCell;

use super::runtime::{CallFrame, Runtime};

/// Bind the reporting primitives into the global namespace.
pub fn install_core_builtins(rt: &mut Runtime) {
    rt.bind_base(GLOBAL_NS, "echo", Arc::new(echo));
}

/// Bind the group/object methods into one class namespace.
pub fn install_object_builtins(rt: &mut Runtime, class_name: &str) {
    rt.bind_base(class_name, "getName", Arc::new(get_name));
    rt.bind_base(class_name, "getId", Arc::new(get_id));
    rt.bind_base(class_name, "add", Arc::new(add));
    rt.bind_base(class_name, "getCount", Arc::new(get_count));
    rt.bind_base(class_name, "getObject", Arc::new(get_object));
}

/// Concatenate all argument texts and emit them as one complete line.
fn echo(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let mut line = String::new();
    for arg in args.iter() {
        line.push_str(&arg.text_value());
    }
    rt.console_write(&line, true);
    Ok(None)
}

/// Method receiver: argument zero, resolved by name then identity.
fn receiver_id(rt: &Runtime, args: &[ValueCell]) -> Result<ObjectId> {
    let text = args.first().map(|cell| cell.text_value().into_owned()).unwrap_or_default();
    rt.objects
        .resolve_ident(&text)
        .ok_or_else(|| RuntimeError::UnknownReceiver(text).into())
}

fn get_name(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let id = receiver_id(rt, args)?;
    let name = rt.objects.entry(id).and_then(|entry| entry.name()).unwrap_or("");
    Ok(Some(ValueCell::from_text(name)))
}

fn get_id(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let id = receiver_id(rt, args)?;
    Ok(Some(ValueCell::from_int(id)))
}

fn add(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let parent = receiver_id(rt, args)?;
    let child_text = args.get(1).map(|cell| cell.text_value().into_owned()).unwrap_or_default();
    let Some(child) = rt.objects.resolve_ident(&child_text) else {
        return Err(RuntimeError::UnknownReceiver(child_text).into());
    };
    rt.objects.add_child(parent, child);
    Ok(None)
}

fn get_count(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let id = receiver_id(rt, args)?;
    Ok(Some(ValueCell::from_int(rt.objects.child_count(id) as i64)))
}

fn get_object(rt: &mut Runtime, _frame: &CallFrame, args: &mut [ValueCell]) -> Result<Option<ValueCell>> {
    let id = receiver_id(rt, args)?;
    let index = args.get(1).map_or(0, |cell| cell.int_value(&rt.objects));
    let child = usize::try_from(index).ok().and_then(|ix| rt.objects.child_at(id, ix));
    match child {
        Some(child) => Ok(Some(ValueCell::from_int(child))),
        None => {
            warn!(id, index, "getObject index out of range");
            Ok(Some(ValueCell::from_int(0)))
        }
    }
}
