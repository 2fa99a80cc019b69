mod chained_keys;
mod composition;
mod compound_key;
mod determinism;
mod introspection;
mod key_dependency;
mod mutations;
mod preference;
mod single_schema;
mod testkit;
mod units;
mod unplannable;
