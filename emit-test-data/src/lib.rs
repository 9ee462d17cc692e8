//! Observation hooks for tests of code emission.
//!
//! Emission records each method body it produces, keyed by the entity it was
//! emitted for, into a concurrent map while many methods are emitted in
//! parallel. Tests then look bodies up by display name through a
//! [`DerivedIndex`] that is built once over a snapshot of that map.

pub mod display;
pub mod index;
pub mod store;

pub use display::display_name;
pub use display::MethodKind;
pub use display::MethodSig;
pub use display::Param;
pub use display::ParamMode;
pub use index::build_unique;
pub use index::DerivedIndex;
pub use store::EmitTestData;
pub use store::EmittedMethod;
pub use store::LookupError;
pub use store::MethodBody;
