pub mod package;
pub mod table;


pub use package::{PackageDef, PackageStack};
pub use table::{BASE_PACKAGE, Callable, FunctionBinding, GLOBAL_NS, NamespaceTable, Resolved, ns_key};
