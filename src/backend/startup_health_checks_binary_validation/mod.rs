pub(crate) mod binary_runtime;
