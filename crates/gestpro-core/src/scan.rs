//! # Camera Scanning
//!
//! Camera decoders report the same barcode many times per second while it
//! stays in frame. The debouncer turns that stream into one event per
//! physical scan.
//!
//! ```text
//!  t=0ms     "EL-001" ──► accepted  ──► cart +1
//!  t=500ms   "EL-001" ──► ignored   (same code, inside window)
//!  t=800ms   "FU-002" ──► accepted  ──► cart +1
//!  t=3000ms  "EL-001" ──► accepted  ──► cart +1
//! ```
//!
//! The window is measured from the last *accepted* occurrence of a code, so a
//! barcode held in front of the lens yields one unit every window.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::view::StoreView;

/// Default debounce window for identical codes.
pub const DEFAULT_SCAN_DEBOUNCE_MS: i64 = 2000;

/// What a camera scan did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum ScanOutcome {
    /// The product was added to the cart.
    #[serde(rename_all = "camelCase")]
    Added { product_id: String, product_name: String },
    /// The code matched a product with no stock left. Cart unchanged.
    #[serde(rename_all = "camelCase")]
    OutOfStock { product_name: String },
    /// Nothing in the catalog carries this code. Cart unchanged.
    NotFound { code: String },
    /// Same code seen again inside the debounce window. Ignored.
    Debounced,
    /// The line or the cart is at its size limit. Cart unchanged.
    #[serde(rename_all = "camelCase")]
    LimitReached { product_name: String },
}

/// Suppresses repeats of the same code within a time window.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    window: Duration,
    last_accepted: HashMap<String, DateTime<Utc>>,
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        ScanDebouncer::new(DEFAULT_SCAN_DEBOUNCE_MS)
    }
}

impl ScanDebouncer {
    pub fn new(window_ms: i64) -> Self {
        ScanDebouncer {
            window: Duration::milliseconds(window_ms),
            last_accepted: HashMap::new(),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.num_milliseconds()
    }

    /// Returns `true` if `code` seen at `at` should be processed.
    pub fn accept(&mut self, code: &str, at: DateTime<Utc>) -> bool {
        let window = self.window;
        // expired entries can never suppress anything again
        self.last_accepted.retain(|_, seen| at - *seen < window);

        if self.last_accepted.contains_key(code) {
            return false;
        }
        self.last_accepted.insert(code.to_string(), at);
        true
    }
}

/// Runs one decoded camera code through the debouncer and into the cart.
///
/// Matching is exact on SKU or product id.
pub fn camera_scan(
    cart: &mut Cart,
    view: &StoreView,
    debouncer: &mut ScanDebouncer,
    code: &str,
    at: DateTime<Utc>,
) -> ScanOutcome {
    if !debouncer.accept(code, at) {
        return ScanOutcome::Debounced;
    }

    match view.find_by_code(code) {
        Some(product) if product.in_stock() => {
            if !cart.add(product) {
                return ScanOutcome::LimitReached {
                    product_name: product.name.clone(),
                };
            }
            ScanOutcome::Added {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
            }
        }
        Some(product) => ScanOutcome::OutOfStock {
            product_name: product.name.clone(),
        },
        None => ScanOutcome::NotFound {
            code: code.to_string(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
