//! Errors raised while building a plan

use thiserror::Error;

/// A malformed declaration list.
///
/// Raised by [`Plan::new`](crate::Plan::new) before any resource is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("resource #{position} has an empty name")]
    EmptyName { position: usize },

    #[error("duplicate resource name '{name}'")]
    DuplicateName { name: String },

    #[error("'{name}' depends on '{target}', which is not declared")]
    MissingDependency { name: String, target: String },

    #[error("'{name}' depends on '{target}', which is declared after it")]
    OrderingViolation { name: String, target: String },

    #[error("'{name}' depends on itself")]
    DependencyCycle { name: String },

    #[error("'{name}' notifies '{target}', which is not declared")]
    MissingNotificationTarget { name: String, target: String },

    #[error("'{name}' notifies itself")]
    SelfNotification { name: String },
}

impl ValidationError {
    /// Name of the offending resource, when there is one
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::EmptyName { .. } => None,
            Self::DuplicateName { name }
            | Self::MissingDependency { name, .. }
            | Self::OrderingViolation { name, .. }
            | Self::DependencyCycle { name }
            | Self::MissingNotificationTarget { name, .. }
            | Self::SelfNotification { name } => Some(name),
        }
    }
}
