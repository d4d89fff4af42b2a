// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Create => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Failures surfaced by console operations. Each one ends the action that
/// triggered it; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("failed to fetch leads: {message}")]
    Fetch { message: String },

    #[error("failed to {} lead: {message}", .action.verb())]
    Mutation {
        action: MutationKind,
        message: String,
    },

    #[error("failed to communicate with agent: {message}")]
    Agent { message: String },

    #[error("failed to reset session: {message}")]
    Reset { message: String },

    #[error("{message}")]
    Invalid { message: String },
}

impl SyncError {
    pub fn fetch(error: &anyhow::Error) -> Self {
        Self::Fetch {
            message: format!("{error:#}"),
        }
    }

    pub fn mutation(action: MutationKind, error: &anyhow::Error) -> Self {
        Self::Mutation {
            action,
            message: format!("{error:#}"),
        }
    }

    pub fn agent(error: &anyhow::Error) -> Self {
        Self::Agent {
            message: format!("{error:#}"),
        }
    }

    pub fn reset(error: &anyhow::Error) -> Self {
        Self::Reset {
            message: format!("{error:#}"),
        }
    }

    pub fn invalid(error: &anyhow::Error) -> Self {
        Self::Invalid {
            message: format!("{error:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationKind, SyncError};

    #[test]
    fn mutation_message_names_the_action() {
        let error = SyncError::mutation(MutationKind::Delete, &anyhow::anyhow!("server returned 500"));
        assert_eq!(error.to_string(), "failed to delete lead: server returned 500");
    }

    #[test]
    fn context_chain_is_kept_in_message() {
        let source = anyhow::anyhow!("connection refused").context("GET /leads");
        let error = SyncError::fetch(&source);
        assert_eq!(
            error.to_string(),
            "failed to fetch leads: GET /leads: connection refused"
        );
    }
}
