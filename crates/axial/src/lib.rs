#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use axial_tensor as tensor;

#[doc(inline)]
pub use axial_tensor_ops as tensor_ops;
