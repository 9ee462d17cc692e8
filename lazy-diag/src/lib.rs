//! Diagnostics that depend on semantic analysis which may not have finished.
//!
//! A reference to an entity can be recorded before the entity's attributes
//! have been bound. Such references become deferred diagnostics: they hold the
//! candidate entity and the calling context, and on first demand force
//! whatever attribute data is missing, classify the reference, and memoize the
//! outcome. Any number of threads may resolve the same diagnostic; one result
//! is published and every caller gets that same `Arc`.
//!
//! ```
//! use lazy_diag::{
//!   AttrData, CallingContext, DeprecationDiagnostic, DeprecationMetadata, Entity, EntityId,
//!   EntityKind, FileId, ResolveOptions, SourceEntity, Span, TextRange,
//! };
//! use std::sync::Arc;
//!
//! let foo = SourceEntity::new(EntityId(0), "Foo", EntityKind::Type, None, || {
//!   AttrData::deprecated(DeprecationMetadata::new().with_message("use Bar instead"))
//! })
//! .into_ref();
//! let site = Span::new(FileId(0), TextRange::new(10, 13));
//! let diagnostic = DeprecationDiagnostic::deprecation(
//!   foo.clone(),
//!   CallingContext::new(site),
//!   Arc::new(ResolveOptions::default()),
//! );
//!
//! assert!(!foo.is_completion_finished());
//! let result = diagnostic.resolve();
//! let reported = result.diagnostic().expect("Foo is deprecated");
//! assert_eq!(reported.message, "`Foo` is deprecated: use Bar instead");
//! assert!(Arc::ptr_eq(&result, &diagnostic.resolve()));
//! ```

pub mod bag;
pub mod classify;
pub mod codes;
pub mod context;
pub mod deferred;
pub mod deprecation;
pub mod diagnostic;
pub mod entity;
pub mod experimental;
pub mod once;
pub mod options;
pub mod policy;

pub use bag::DiagnosticBag;
pub use classify::classify;
pub use classify::settle;
pub use classify::Classification;
pub use classify::Settled;
pub use classify::Terminal;
pub use context::CallingContext;
pub use context::ContextFlags;
pub use deferred::ComputeDiagnostic;
pub use deferred::DeferredDiagnostic;
pub use deferred::LazyDiagnostic;
pub use deprecation::report_deprecation;
pub use deprecation::DeprecationDiagnostic;
pub use diagnostic::Diagnostic;
pub use diagnostic::DiagnosticResult;
pub use diagnostic::FileId;
pub use diagnostic::Severity;
pub use diagnostic::Span;
pub use diagnostic::Subject;
pub use diagnostic::TextRange;
pub use entity::AttrData;
pub use entity::DeprecationKind;
pub use entity::DeprecationMetadata;
pub use entity::Entity;
pub use entity::EntityId;
pub use entity::EntityKind;
pub use entity::EntityRef;
pub use entity::SourceEntity;
pub use experimental::ExperimentalDiagnostic;
pub use once::OnceSlot;
pub use options::OptionsError;
pub use options::ResolveOptions;
pub use policy::SuppressionPolicy;
pub use policy::Verdict;
