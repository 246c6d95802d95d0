// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use crate::resources::QuantityError;
use miette::Diagnostic;
use thiserror::Error;

/// Core error type for Eagle operations
#[derive(Error, Debug, Diagnostic)]
pub enum EagleError {
    /// A resource quantity could not be parsed
    #[error("Invalid quantity for {resource_name}: {quantity}")]
    #[diagnostic(
        code(eagle::invalid_quantity),
        help("Use a Kubernetes quantity such as '500m', '2', '128Mi' or '1Gi'")
    )]
    InvalidQuantity {
        #[allow(unused)]
        resource_name: String,
        #[allow(unused)]
        quantity: String,
        #[source]
        #[allow(unused)]
        source: QuantityError,
    },

    /// Summing resource amounts exceeded the representable range
    #[error("Total {resource_name} exceeds the representable range")]
    #[diagnostic(
        code(eagle::resource_overflow),
        help("Check the pod and node manifests for unrealistically large quantities")
    )]
    ResourceOverflow {
        #[allow(unused)]
        resource_name: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(eagle::serialization_error),
        help("Ensure the resource format is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(eagle::internal_error),
        help("This is likely a bug. Please report it with the full error details")
    )]
    InternalError {
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for Eagle core operations
pub type Result<T> = std::result::Result<T, EagleError>;

impl EagleError {
    /// Create an InvalidQuantity error
    pub fn invalid_quantity(
        resource_name: impl Into<String>,
        quantity: impl Into<String>,
        source: QuantityError,
    ) -> Self {
        Self::InvalidQuantity {
            resource_name: resource_name.into(),
            quantity: quantity.into(),
            source,
        }
    }

    /// Create a ResourceOverflow error
    pub fn resource_overflow(resource_name: impl Into<String>) -> Self {
        Self::ResourceOverflow {
            resource_name: resource_name.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
