pub mod payment;
pub mod response;
pub mod upstream;

pub use payment::*;
pub use response::*;
pub use upstream::*;
