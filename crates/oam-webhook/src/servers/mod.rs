//! Contains high-level ready-to-use webhook server implementations for specific
//! purposes.
mod conversion;

pub use conversion::{ConversionWebhookError, ConversionWebhookOptions, ConversionWebhookServer};
pub use kube::core::conversion::ConversionReview;
