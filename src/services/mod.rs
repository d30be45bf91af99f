pub mod locales;
pub mod payments;
pub mod platform;

pub use locales::LocaleService;
pub use payments::PaymentService;
pub use platform::{PaymentPlatform, PiPlatformClient};
