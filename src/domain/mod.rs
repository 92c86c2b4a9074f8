// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the churn pipeline.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they are computed.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One row of a raw transaction table
pub mod transaction;

// The fixed, ordered feature layout shared by training and inference
pub mod schema;

// Typed failures raised by the pipeline core
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
