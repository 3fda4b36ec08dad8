//! Error types for widget operations.

use thiserror::Error;

use crate::pipeline::TransmitError;
use crate::widget::WidgetId;

/// Result type for widget operations.
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Errors that can occur in widget operations.
///
/// Failures here are fatal to the operation that raised them; silent
/// skips (an unmatched pointer-up, a local target without the addressed
/// key, an unroutable inbound message) are by design not represented as
/// errors.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The widget was already attached to a panel.
    #[error("widget is already attached to a panel")]
    AlreadyPlaced,

    /// The widget does not exist in the panel.
    #[error("widget not found: {0}")]
    WidgetNotFound(WidgetId),

    /// Remote transmission failed.
    #[error(transparent)]
    Transmit(#[from] TransmitError),
}
