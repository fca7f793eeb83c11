pub(crate) mod cache_scope;
