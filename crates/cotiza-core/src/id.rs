//! # Identifier Generation
//!
//! Quotes and equipment are keyed by opaque, collision-resistant tokens.
//! Generation sits behind [`IdGenerator`] so repositories can be handed a
//! deterministic generator in tests.

use std::fmt::Debug;

use uuid::Uuid;

/// Source of fresh record ids.
///
/// Ids must be unique and are never reused once handed out.
pub trait IdGenerator: Debug + Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 ids. The default everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        new_id()
    }
}

/// Generates a new UUID v4 id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_is_unique() {
        let ids = UuidGenerator;
        let a = ids.generate();
        let b = ids.generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
