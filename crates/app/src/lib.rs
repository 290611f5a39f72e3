//! Order domain, persistence, and messaging shared by the API server and the CLI.

pub mod context;
pub mod database;
pub mod domain;
pub mod messaging;

#[cfg(test)]
mod test;

mod ids;
