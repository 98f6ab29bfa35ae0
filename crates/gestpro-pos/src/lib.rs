//! # gestpro-pos: Terminal Facade for GestPro
//!
//! Ties the pure rules in `gestpro-core` to the storage in `gestpro-db`
//! behind one type, [`PosTerminal`], which a front end drives.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Front end (cashier screen / admin CLI)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PosTerminal ──── cart, scan debounce, pending transaction id          │
//! │       │                                                                 │
//! │       ├──► gestpro-core  validation, totals, receipts, reports         │
//! │       │                                                                 │
//! │       └──► gestpro-db    settlement, catalog CRUD, restore / wipe      │
//! │                                                                         │
//! │  Errors leave as PosError { code, message }                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gestpro_pos::{PosConfig, PosTerminal};
//! use gestpro_core::Session;
//!
//! let config = PosConfig::load(None)?;
//! let mut pos = PosTerminal::open(config, Session::new("u2", "Bob")).await?;
//! pos.add_to_cart(&product_id)?;
//! let receipt = pos.commit_sale().await?;
//! println!("{}", receipt.render_text());
//! ```

pub mod advisory;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;

pub use advisory::{Advisor, GeneratorError, TextGenerator};
pub use config::{ConfigError, ConfigResult, PosConfig};
pub use error::{ErrorCode, PosError, PosResult};
pub use logging::init_tracing;
pub use terminal::PosTerminal;
