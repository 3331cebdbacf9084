//! # Regscope
//!
//! An analyst console for a regulatory document corpus.
//!
//! Regscope lets an analyst submit a document by URL or pasted text,
//! preview the summarized/tagged draft returned by the corpus service,
//! edit it, and commit it to the corpus, then build visualization
//! view-models (distribution counts, a tag matrix, a severity scatter,
//! a word cloud, and a document/tag network) over the committed
//! collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ StagingSession│──▶│   Backend    │◀──│  Aggregator   │
//! │ preview→edit→ │   │ HTTP / memory│   │ 6 projections │
//! │ commit        │   └──────┬───────┘   └───────┬───────┘
//! └───────────────┘          │                   │
//!                            ▼                   ▼
//!                      ┌──────────┐       ┌──────────────┐
//!                      │   CLI    │       │  Snapshot    │
//!                      │  (reg)   │       │  JSON export │
//!                      └──────────┘       └──────────────┘
//! ```
//!
//! The summarization/tagging service, the document store, and the chart
//! renderers are external collaborators: this crate owns the staging
//! state machine, the aggregation engine, and the client seams they sit
//! behind.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`backend`] | Corpus service trait, HTTP client, in-memory fake |
//! | [`staging`] | Two-phase submission workflow |
//! | [`aggregate`] | Projection engine for visualization view-models |

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod list;
pub mod models;
pub mod notify;
pub mod show;
pub mod staging;
pub mod submit;
pub mod viz;
