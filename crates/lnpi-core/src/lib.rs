//! Core types and traits for lnPi phase segmentation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the
//! [`Field`] landscape, region masks and label maps, mask conventions,
//! error types, and the [`LnPi`] collaborator trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod mask;
pub mod traits;

pub use error::FieldError;
pub use field::Field;
pub use id::{Coord, Label, PhaseTag};
pub use mask::{
    change_convention, masks_change_convention, masks_to_labels, LabelMap, Mask, MaskConvention,
};
pub use traits::LnPi;
