//! defkit-core: the typed model behind KubeVela definitions.
//!
//! Callers describe component and trait definitions with parameters,
//! resource skeletons, conditional field assignments and list
//! comprehensions. The `defkit-codegen` crate turns the finished model into
//! CUE text.
//!
//! # Public API
//!
//! - [`Value`] and [`Condition`] -- closed expression and guard enums
//! - [`Param`] -- parameter declarations
//! - [`ResourceBuilder`] / [`Resource`] -- conditional field assignments
//! - [`ArrayBuilder`] / [`ItemBuilder`] -- list entries and comprehensions
//! - [`each`] / [`for_each_map`] -- declarative collection mappings
//! - [`ComponentDefinition`], [`TraitDefinition`], [`Definition`]
//!
//! Builders are frozen into immutable values; nothing in this crate
//! performs I/O.

pub mod array;
pub mod collection;
pub mod condition;
pub mod definition;
pub mod error;
pub mod functions;
pub mod param;
pub mod path;
pub mod resource;
pub mod template;
pub mod value;

// ── Convenience re-exports: model types ──────────────────────────────

pub use array::{
    ArrayBuilder, ArrayElement, ArrayEntry, ArrayValue, ElementOp, ItemBuilder, ItemOp,
    IterVarHandle, Iteration,
};
pub use collection::{
    each, field_map, field_ref, for_each_map, optional_field_ref, optional_field_with_cond,
    or_conditional, or_field, Collection, FieldMap, FieldValue, MapComprehension, VariantMap,
};
pub use condition::{and, eq, field_equals, ge, gt, le, lt, ne, not, or, CmpOp, Condition};
pub use definition::{ComponentDefinition, Definition, TraitDefinition, WorkloadSpec};
pub use error::PathError;
pub use param::{Param, ParamType, Variant};
pub use path::{FieldPath, Segment};
pub use resource::{patch, resource, CondValue, Directive, Resource, ResourceBuilder};
pub use template::{Helper, HelperPlacement, NamedOutput, Template, TemplateBuilder};
pub use value::{
    array_concat, context, divide, inline_array, inline_struct, interpolate, list, lit, minus,
    null, param_ref, plus, reference, times, ArithOp, BinaryOp, FunctionCall, InlineStruct,
    Literal, LiteralKind, ParamRef, Value,
};
