//! Namespace table: class-qualified function bindings in stacked layers.
//!
//! Each namespace (a class name, or the global namespace under the empty
//! key) owns an ordered list of layers, one per package that bound anything
//! there, with the lazily created "base" layer at the bottom. Ordinary
//! resolution sees only the top layer; lower layers are reachable solely
//! through parent calls from the layer above them.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::rt::{CallFrame, Runtime};
use crate::util::fast_map::{FastHashMap, fast_hash_map_new};
use crate::util::key;
use crate::val::ValueCell;

/// Key of the global namespace.
pub const GLOBAL_NS: &str = "";

/// Package name of the bottom layer holding non-package bindings.
pub const BASE_PACKAGE: &str = "base";

/// Fold a namespace name to its table key; empty text means global.
#[inline]
pub fn ns_key(name: &str) -> String {
    key::fold(name)
}

/// A host function. Receives the runtime, the frame that owns the executing
/// binding (for parent calls), and the marshaled arguments.
pub type Callable = Arc<dyn Fn(&mut Runtime, &CallFrame, &mut [ValueCell]) -> Result<Option<ValueCell>>>;

/// One registered function. Immutable once created; shadowed bindings stay
/// alive and reachable through parent calls.
#[derive(Clone)]
pub struct FunctionBinding {
    pub name: Arc<str>,
    /// Folded key of the owning namespace.
    pub namespace: Arc<str>,
    /// Owning package, or [`BASE_PACKAGE`].
    pub package: Arc<str>,
    pub func: Callable,
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) struct Layer {
    pub(crate) package: Arc<str>,
    funcs: FastHashMap<String, FunctionBinding>,
}

impl Layer {
    fn new(package: Arc<str>) -> Self {
        Self {
            package,
            funcs: fast_hash_map_new(),
        }
    }
}

/// A binding resolved together with the index of the layer it lives in;
/// the index is what parent calls chain from.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub binding: FunctionBinding,
    pub layer: usize,
}

#[derive(Debug, Default)]
pub struct NamespaceTable {
    spaces: FastHashMap<String, Vec<Layer>>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind into a namespace's base layer, creating the namespace and the
    /// base layer (always at the bottom) as needed. A rebind of the same
    /// name replaces the base entry.
    pub fn bind_base(&mut self, namespace: &str, func_name: &str, func: Callable) {
        let ns: Arc<str> = Arc::from(ns_key(namespace));
        let layers = self.spaces.entry(ns.to_string()).or_default();
        let has_base = layers.first().is_some_and(|layer| &*layer.package == BASE_PACKAGE);
        if !has_base {
            layers.insert(0, Layer::new(Arc::from(BASE_PACKAGE)));
        }
        let binding = FunctionBinding {
            name: Arc::from(func_name),
            namespace: ns,
            package: Arc::from(BASE_PACKAGE),
            func,
        };
        layers[0].funcs.insert(key::fold(func_name), binding);
    }

    pub(crate) fn push_layer(
        &mut self,
        namespace: &str,
        package: Arc<str>,
        funcs: Vec<(String, Callable)>,
    ) {
        let ns: Arc<str> = Arc::from(ns_key(namespace));
        let mut layer = Layer::new(package.clone());
        for (func_name, func) in funcs {
            let binding = FunctionBinding {
                name: Arc::from(func_name.as_str()),
                namespace: ns.clone(),
                package: package.clone(),
                func,
            };
            layer.funcs.insert(key::fold(&func_name), binding);
        }
        self.spaces.entry(ns.to_string()).or_default().push(layer);
    }

    /// Pop a namespace's top layer. Only the package stack calls this, and
    /// only for layers it pushed.
    pub(crate) fn pop_layer(&mut self, namespace: &str) {
        if let Some(layers) = self.spaces.get_mut(&ns_key(namespace)) {
            layers.pop();
            if layers.is_empty() {
                self.spaces.remove(&ns_key(namespace));
            }
        }
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.spaces.contains_key(&ns_key(namespace))
    }

    /// Number of layers currently stacked on a namespace.
    pub fn layer_count(&self, namespace: &str) -> usize {
        self.spaces.get(&ns_key(namespace)).map_or(0, Vec::len)
    }

    /// Package owning a namespace's top layer.
    pub fn top_package(&self, namespace: &str) -> Option<&str> {
        let layers = self.spaces.get(&ns_key(namespace))?;
        layers.last().map(|layer| &*layer.package)
    }

    /// Ordinary resolution: the namespace's top layer only. Shadowing is
    /// total; lower layers are invisible here.
    pub fn resolve(&self, namespace: &str, func_name: &str) -> Option<Resolved> {
        let layers = self.spaces.get(&ns_key(namespace))?;
        let top = layers.len().checked_sub(1)?;
        let binding = layers[top].funcs.get(&key::fold(func_name))?.clone();
        Some(Resolved { binding, layer: top })
    }

    /// Parent-call resolution: the first match strictly below `below_layer`,
    /// scanning downward. Packages that never touched this namespace pushed
    /// no layer here, so the walk skips them transparently.
    pub fn resolve_parent(&self, namespace: &str, below_layer: usize, func_name: &str) -> Option<Resolved> {
        let layers = self.spaces.get(&ns_key(namespace))?;
        let func_key = key::fold(func_name);
        layers
            .iter()
            .enumerate()
            .take(below_layer.min(layers.len()))
            .rev()
            .find_map(|(idx, layer)| {
                layer.funcs.get(&func_key).map(|binding| Resolved {
                    binding: binding.clone(),
                    layer: idx,
                })
            })
    }
}
