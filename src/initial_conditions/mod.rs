mod profiles;
pub use profiles::*;
