//! Launch argument declarations, overrides and substitution

mod argument;
mod overrides;
mod substitution;

pub use argument::*;
pub use overrides::*;
pub use substitution::*;
