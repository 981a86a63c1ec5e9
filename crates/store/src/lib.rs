//! Row-level client for the Postgres-backed BaaS.
//!
//! The BaaS exposes table CRUD over a PostgREST-style HTTP API; this crate
//! wraps it in a small fluent builder (`client.from("messages").select(…)
//! .eq(…).order(…)`) plus typed repositories for the tables the gateway
//! touches. The relational store itself is never reached directly; every
//! query goes through the BaaS, which owns auth and row-level policies.

mod client;
mod error;
mod tables;

pub use client::{BaasClient, Order, QueryBuilder};
pub use error::StoreError;
pub use tables::{Conversations, Messages, TechNotes, Users};
