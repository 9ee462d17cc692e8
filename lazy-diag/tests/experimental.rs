mod common;

use std::sync::Arc;

use common::{completed, context};
use lazy_diag::{
  codes, AttrData, ContextFlags, EntityId, EntityKind, ExperimentalDiagnostic, ResolveOptions,
  Severity, SourceEntity,
};

fn options() -> Arc<ResolveOptions> {
  Arc::new(ResolveOptions::default())
}

#[test]
fn experimental_api_use_is_reported() {
  let api = SourceEntity::new(EntityId(0), "Preview", EntityKind::Method, None, || {
    AttrData::experimental()
  })
  .into_ref();
  let lazy = ExperimentalDiagnostic::experimental(api, context(), options());
  let result = lazy.resolve();
  let diagnostic = result.diagnostic().expect("experimental use reported");
  assert_eq!(diagnostic.code, codes::EXPERIMENTAL.as_str());
  assert_eq!(diagnostic.severity, Severity::Warning);
  assert_eq!(
    diagnostic.message,
    "method `Preview` is experimental and may change or be removed"
  );
}

#[test]
fn opt_in_flag_suppresses() {
  let api = completed(0, "Preview", AttrData::experimental());
  let lazy = ExperimentalDiagnostic::experimental(
    api,
    context().with_flags(ContextFlags::SUPPRESS_EXPERIMENTAL),
    options(),
  );
  assert!(lazy.resolve().is_void());
}

#[test]
fn experimental_container_suppresses() {
  let api = completed(0, "Preview", AttrData::experimental());
  let caller = completed(1, "AlsoPreview", AttrData::experimental());
  let lazy = ExperimentalDiagnostic::experimental(api, context().within(caller), options());
  assert!(lazy.resolve().is_void());
}

#[test]
fn deprecation_does_not_imply_experimental() {
  let api = completed(0, "Old", common::deprecated("old"));
  let lazy = ExperimentalDiagnostic::experimental(api, context(), options());
  assert!(lazy.resolve().is_void());
}
