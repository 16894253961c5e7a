//! Bridge Types
//!
//! Core data structures for the host capability bridge. These types define
//! the serialized contract between the offline binding generator, the
//! host-side runtime, and the client-side proxy layer. Schemas are stored
//! as JSON and shared read-only for a session's lifetime.

pub mod mapper;
pub mod schema;
pub mod version;

pub use mapper::{MapError, TypeDescriptor, map_type, normalize_type};
pub use schema::{
    CapabilityDescriptor, MethodDescriptor, ParamDescriptor, Schema, SignalDescriptor,
};
pub use version::{is_compatible, parse_major};
