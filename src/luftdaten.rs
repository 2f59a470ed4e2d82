mod air_quality;
mod feed;
mod measurement;
mod value_type;

pub use air_quality::*;
pub use feed::*;
pub use measurement::*;
pub use value_type::*;
