//! Display names used as lookup keys for emitted methods.
//!
//! Names are fully qualified and include parameter types so overloads stay
//! distinct: `N.C.M<T>(ref int, params object[])`. User-defined operators
//! also carry their return type: `C N.C.op_Addition(C, C)`. Conversions do
//! not, so two conversions differing only in return type share a name and
//! neither is reachable by name.

use lazy_diag::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
  Ordinary,
  Constructor,
  Accessor,
  UserDefinedOperator,
  /// `op_Implicit` / `op_Explicit`.
  Conversion,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParamMode {
  #[default]
  Value,
  Ref,
  Out,
  Params,
  /// Receiver of an extension method.
  This,
}

impl ParamMode {
  const fn prefix(&self) -> &'static str {
    match self {
      ParamMode::Value => "",
      ParamMode::Ref => "ref ",
      ParamMode::Out => "out ",
      ParamMode::Params => "params ",
      ParamMode::This => "this ",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
  pub ty: String,
  pub mode: ParamMode,
}

impl Param {
  pub fn new(ty: impl Into<String>) -> Self {
    Self {
      ty: ty.into(),
      mode: ParamMode::Value,
    }
  }

  pub fn with_mode(mut self, mode: ParamMode) -> Self {
    self.mode = mode;
    self
  }
}

/// What emission knows about the method it produced a body for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
  pub entity: EntityId,
  /// Enclosing namespaces and types, outermost first.
  pub containers: Vec<String>,
  pub name: String,
  pub type_params: Vec<String>,
  pub params: Vec<Param>,
  pub ret: String,
  pub kind: MethodKind,
}

impl MethodSig {
  pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
    Self {
      entity,
      containers: Vec::new(),
      name: name.into(),
      type_params: Vec::new(),
      params: Vec::new(),
      ret: "void".to_string(),
      kind: MethodKind::Ordinary,
    }
  }

  pub fn in_container(mut self, container: impl Into<String>) -> Self {
    self.containers.push(container.into());
    self
  }

  pub fn with_type_param(mut self, name: impl Into<String>) -> Self {
    self.type_params.push(name.into());
    self
  }

  pub fn with_param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn returning(mut self, ret: impl Into<String>) -> Self {
    self.ret = ret.into();
    self
  }

  pub fn with_kind(mut self, kind: MethodKind) -> Self {
    self.kind = kind;
    self
  }
}

pub fn display_name(sig: &MethodSig) -> String {
  let mut out = String::new();
  if sig.kind == MethodKind::UserDefinedOperator {
    out.push_str(&sig.ret);
    out.push(' ');
  }
  for container in &sig.containers {
    out.push_str(container);
    out.push('.');
  }
  out.push_str(&sig.name);
  if !sig.type_params.is_empty() {
    out.push('<');
    out.push_str(&sig.type_params.join(", "));
    out.push('>');
  }
  out.push('(');
  for (i, param) in sig.params.iter().enumerate() {
    if i > 0 {
      out.push_str(", ");
    }
    out.push_str(param.mode.prefix());
    out.push_str(&param.ty);
  }
  out.push(')');
  out
}
