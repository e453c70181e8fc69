//! Entity catalogue and scope chain.
//!
//! Entities are the typed semantic nodes produced by the converter. They are
//! reference counted; containers and source nodes are weak back references.
//! Modules, classes and functions own symbol tables, and `scope::resolve`
//! walks them outward through containers.

pub mod entity;
pub mod scope;
