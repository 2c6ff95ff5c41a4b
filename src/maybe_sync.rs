//! Thread-safety bound that only applies to parallel dispatch.
//!
//! With the `parallel` feature, [`MaybeSendSync`] means `Send + Sync`, since
//! rayon moves functor clones across its workers. Without it the bound holds
//! for every type, so sequential kernels may capture `Rc` or `Cell`.

#[cfg(feature = "parallel")]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync> MaybeSendSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSendSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSendSync for T {}
