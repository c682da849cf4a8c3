#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pointfit_3d as p3d;

#[doc(inline)]
pub use pointfit_fit as fit;

#[doc(inline)]
pub use pointfit_mls as mls;
