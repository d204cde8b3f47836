//! # LAQ Audit
//!
//! Retrieval and cross-reference auditing for Legislative Assembly
//! Question (LAQ) records.
//!
//! LAQ Audit answers two questions about a vector store of LAQ records
//! and their annexure attachments: "which past questions resemble this
//! query" (semantic retrieval with graded match quality) and "does every
//! answer's annexure reference resolve to a stored attachment, and is
//! every stored attachment actually referenced" (cross-reference
//! validation).
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────────┐
//! │ Embedding │──▶│  Retrieval  │──▶│ Context block │
//! │ (Ollama)  │   │ score+rank │   │  assembler    │
//! └───────────┘   └─────┬──────┘   └───────────────┘
//!                       │
//!                 ┌─────┴──────┐
//!                 │ VectorStore │◀── corpus snapshot (JSON)
//!                 └─────┬──────┘
//!                       │
//!                 ┌─────┴──────┐
//!                 │ Validator  │──▶ reports / stats / dedupe
//!                 └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! laq --corpus snapshot.json validate-all
//! laq --corpus snapshot.json validate LAQ-2024-0117
//! laq --corpus snapshot.json stats
//! laq --corpus snapshot.json duplicates --remove
//! laq --corpus snapshot.json search "water infrastructure funding"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types and metadata key names |
//! | [`labels`] | Annexure label normalization and reference extraction |
//! | [`store`] | Vector store abstraction and in-memory implementation |
//! | [`scoring`] | Distance-to-similarity conversion and match tiers |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`retrieval`] | Query pipeline: embed, search, score, filter, rank |
//! | [`context`] | Human-readable context blocks from search results |
//! | [`validate`] | Annexure cross-reference validation and dedupe |
//! | [`corpus`] | JSON corpus snapshots for offline runs |

pub mod config;
pub mod context;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod labels;
pub mod models;
pub mod retrieval;
pub mod scoring;
pub mod store;
pub mod validate;
