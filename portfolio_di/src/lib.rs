//! Minimal compile time dependency injection.
//!
//! A [`Provider`] holds the leaf dependencies (configuration, external
//! connections). Every other service derives [`Build`] and is assembled from
//! its fields. Built values are cached per provider, so a service that appears
//! in several places of the dependency graph is only built once and all users
//! share its state.

extern crate self as portfolio_di;

pub use portfolio_di_derive::Build;
pub use typemap::TypeMap;

mod macros;
mod typemap;

pub trait Provider: Sized {
    /// Cache of the values that have already been built by this provider.
    fn cache(&mut self) -> &mut TypeMap;
}

#[diagnostic::on_unimplemented(
    message = "The type `{Self}` cannot be built using the provider `{P}`",
    note = "Add `{Self}` to the provider `{P}` or implement `Build` for `{Self}` and make sure \
            all dependencies are satisfied"
)]
pub trait Build<P: Provider>: Clone + 'static {
    fn build(provider: &mut P) -> Self;
}

pub trait Provide: Provider {
    fn provide<T: Build<Self>>(&mut self) -> T {
        T::build(self)
    }
}

impl<P: Provider> Provide for P {}
