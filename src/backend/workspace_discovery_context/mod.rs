pub(crate) mod discovery_runtime;
pub(crate) mod discovery_scope;
pub(crate) mod resolve_runtime;
pub(crate) mod walk_runtime;
