//! Domain layer - Core console objects
//! 
//! This layer contains:
//! - Entities: Immutable values (Message, Snippet, Command)
//! - Traits: Abstractions for collaborators (IoModule, Connection, MessageListener)

pub mod entities;
pub mod traits;
