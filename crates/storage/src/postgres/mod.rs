mod client;

pub use client::PostgresInteractionStore;
