//! Unified operator capability surface for inbound adapters.

use super::diagnostic::DiagnosticOperator;
use super::service::ServiceOperator;

/// Unified operator capability surface consumed by inbound adapters.
pub trait OperatorPort: DiagnosticOperator + ServiceOperator {}

impl<T> OperatorPort for T where T: DiagnosticOperator + ServiceOperator {}
