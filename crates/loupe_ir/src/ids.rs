//! Opaque ID newtypes for expressions, statements, and scopes.
//!
//! Each ID is a thin `u32` wrapper created by [`Arena::alloc`](crate::arena::Arena::alloc).
//! An [`ExprId`] doubles as the stable expression identifier that report
//! renderers and exclusion requests use to address a node.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Stable identifier of an expression node.
    ExprId,
    "e"
);

define_id!(
    /// Identifier of a statement (the logical owner of one expression tree).
    StmtId,
    "s"
);

define_id!(
    /// Identifier of a scope: a module, task, function, or instance.
    ScopeId,
    "u"
);
