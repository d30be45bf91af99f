pub mod health;
pub mod i18n;
pub mod payments;
pub mod validation;

pub use health::*;
pub use i18n::*;
pub use payments::*;
pub use validation::*;
