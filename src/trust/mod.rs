//! Repository config trust
//!
//! A repository config can pick the engine binary and the prompt sent to it,
//! so it is only loaded once its exact bytes have been accepted by the
//! operator. Accepted hashes live in a small JSON store under the user's
//! config directory.

mod consent;
mod gate;
mod store;

pub use consent::{is_affirmative, ConsentPrompt, StreamConsent, TerminalConsent};
pub use gate::{
    consent_message, content_hash, evaluate, Admission, Evaluation, GateState, TrustDecision,
    TrustError, TrustGate, CONSENT_QUESTION, CONTENT_DELIMITER,
};
pub use store::{StoreError, StoreSchema, TrustEntry, TrustStore};
