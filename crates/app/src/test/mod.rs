//! Shared test infrastructure

mod context;
mod db;

pub(crate) use context::TestContext;
