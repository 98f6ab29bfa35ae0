//! # Advisory Text
//!
//! Optional, never-failing text helpers backed by a host-provided
//! [`TextGenerator`]: product blurbs and business insight.
//!
//! ```text
//! Advisor::business_insight(question, view)
//!      │
//!      ├── no generator ─────────────► MISSING_GENERATOR
//!      ├── generator error ──────────► INSIGHT_FAILED   (logged)
//!      ├── empty answer ─────────────► NO_INSIGHT
//!      └── answer ───────────────────► answer
//! ```
//!
//! Nothing in checkout or the catalog waits on this module.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use gestpro_core::report::advisory_context;
use gestpro_core::StoreView;

pub const MISSING_GENERATOR: &str = "Text generation is not configured.";
pub const INSIGHT_FAILED: &str = "Failed to generate insight. Please try again.";
pub const NO_INSIGHT: &str = "No insight generated.";
pub const DESCRIPTION_FAILED: &str = "Could not generate description.";

/// Boxed error a generator may return.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync>;

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Answers `prompt`, given `context` as supporting data.
    async fn generate(&self, prompt: &str, context: &str) -> Result<String, GeneratorError>;
}

/// Prompt builder around an optional [`TextGenerator`].
#[derive(Clone, Default)]
pub struct Advisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("configured", &self.generator.is_some())
            .finish()
    }
}

impl Advisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Advisor {
            generator: Some(generator),
        }
    }

    /// An advisor that always answers with the placeholder.
    pub fn disabled() -> Self {
        Advisor::default()
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Answers a free-form question about the store's figures.
    pub async fn business_insight(
        &self,
        question: &str,
        view: &StoreView,
        low_stock_threshold: i64,
    ) -> String {
        let Some(generator) = &self.generator else {
            return MISSING_GENERATOR.to_string();
        };

        let context = advisory_context(view, low_stock_threshold).to_string();
        let prompt = format!(
            "You are a business intelligence assistant for a retail management system. \
             Analyze the context data (JSON) and answer the question accurately and professionally.\n\n\
             Question:\n{}",
            question
        );

        match generator.generate(&prompt, &context).await {
            Ok(text) if text.trim().is_empty() => NO_INSIGHT.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Business insight generation failed");
                INSIGHT_FAILED.to_string()
            }
        }
    }

    /// Short marketing description for a product. Empty when the
    /// generator returns nothing.
    pub async fn product_description(&self, name: &str, category: &str) -> String {
        let Some(generator) = &self.generator else {
            return MISSING_GENERATOR.to_string();
        };

        let prompt = format!(
            "Write a compelling, short marketing description (max 2 sentences) for a product \
             named \"{}\" in the category \"{}\".",
            name, category
        );

        match generator.generate(&prompt, "").await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, product = %name, "Description generation failed");
                DESCRIPTION_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str, context: &str) -> Result<String, GeneratorError> {
            Ok(format!("{} | {}", prompt.len(), context))
        }
    }

    struct Broken;

    #[async_trait]
    impl TextGenerator for Broken {
        async fn generate(&self, _prompt: &str, _context: &str) -> Result<String, GeneratorError> {
            Err("quota exceeded".into())
        }
    }

    struct Silent;

    #[async_trait]
    impl TextGenerator for Silent {
        async fn generate(&self, _prompt: &str, _context: &str) -> Result<String, GeneratorError> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_generator_placeholder() {
        let advisor = Advisor::disabled();
        let view = StoreView::new();
        assert_eq!(advisor.business_insight("Best day?", &view, 10).await, MISSING_GENERATOR);
        assert_eq!(advisor.product_description("Mouse", "Accessories").await, MISSING_GENERATOR);
    }

    #[tokio::test]
    async fn test_insight_passes_context() {
        let advisor = Advisor::new(Arc::new(Echo));
        let answer = advisor.business_insight("Best day?", &StoreView::new(), 10).await;
        assert!(answer.contains("\"totalSalesCount\":0"));
    }

    #[tokio::test]
    async fn test_failures_degrade_to_placeholders() {
        let broken = Advisor::new(Arc::new(Broken));
        assert_eq!(broken.business_insight("?", &StoreView::new(), 10).await, INSIGHT_FAILED);
        assert_eq!(broken.product_description("Mouse", "Accessories").await, DESCRIPTION_FAILED);

        let silent = Advisor::new(Arc::new(Silent));
        assert_eq!(silent.business_insight("?", &StoreView::new(), 10).await, NO_INSIGHT);
        assert_eq!(silent.product_description("Mouse", "Accessories").await, "");
    }
}
