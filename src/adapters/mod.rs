// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod firebase_auth;
pub mod firestore;
pub mod memory;

pub use firebase_auth::FirebaseIdentityGateway;
pub use firestore::FirestoreProfileStore;
pub use memory::{InMemoryIdentityGateway, InMemoryProfileStore};
