mod amount;
mod period;
mod record;

pub use amount::*;
pub use period::*;
pub use record::*;
