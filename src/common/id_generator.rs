// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., CA_K7NP3X for candidates)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ID_LENGTH: usize = 6;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Candidate (CA_)
    Candidate,
    /// Job posting (J_)
    Job,
    /// User (U_)
    User,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Candidate => "CA",
            EntityPrefix::Job => "J",
            EntityPrefix::User => "U",
        }
    }
}

/// Generate a prefixed Crockford Base32 ID
pub fn generate_id(prefix: EntityPrefix) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_LENGTH)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..CROCKFORD_ALPHABET.len())] as char)
        .collect();
    format!("{}_{}", prefix.as_str(), suffix)
}

pub fn generate_candidate_id() -> String {
    generate_id(EntityPrefix::Candidate)
}

pub fn generate_job_id() -> String {
    generate_id(EntityPrefix::Job)
}

/// Check whether a string looks like one of our prefixed IDs
pub fn is_valid_id(id: &str) -> bool {
    let Some((prefix, suffix)) = id.split_once('_') else {
        return false;
    };
    if prefix.is_empty() || suffix.len() != ID_LENGTH {
        return false;
    }
    suffix
        .bytes()
        .all(|b| CROCKFORD_ALPHABET.contains(&b.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_carry_prefix() {
        let id = generate_candidate_id();
        assert!(id.starts_with("CA_"));
        assert_eq!(id.len(), "CA_".len() + ID_LENGTH);
        assert!(is_valid_id(&id));

        assert!(generate_job_id().starts_with("J_"));
        assert!(generate_id(EntityPrefix::User).starts_with("U_"));
    }

    #[test]
    fn test_is_valid_id_rejects_garbage() {
        assert!(!is_valid_id("CA_"));
        assert!(!is_valid_id("no-separator"));
        assert!(!is_valid_id("CA_ILOU!!"));
        assert!(!is_valid_id("_ABCDEF"));
    }
}
