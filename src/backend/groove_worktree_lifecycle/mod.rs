pub(crate) mod groove_runtime;
pub(crate) mod lifecycle_scope;
pub(crate) mod list_runtime;
