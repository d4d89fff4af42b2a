// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(LeadId);

#[cfg(test)]
mod tests {
    use super::LeadId;

    #[test]
    fn lead_id_is_a_bare_integer_on_the_wire() -> anyhow::Result<()> {
        let id: LeadId = serde_json::from_str("42")?;
        assert_eq!(id, LeadId::new(42));
        assert_eq!(serde_json::to_string(&id)?, "42");
        assert_eq!(id.to_string(), "42");
        Ok(())
    }
}
