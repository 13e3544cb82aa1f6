//! Execution side of compiled templates.
//!
//! Compilation produces program listings; this module owns everything that
//! happens after: loading listings into [`Program`]s, evaluating binding
//! paths against a [`Scope`], and rendering to [`VNode`] trees.

pub mod path;
pub mod program;
pub mod render;
pub mod vnode;

pub use path::{display_value, is_truthy, is_valid_path, lookup, path_root, Scope};
pub use program::{Program, ProgramError, RenderOp};
pub use render::Renderer;
pub use vnode::VNode;
