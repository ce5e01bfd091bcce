pub mod error;
pub mod ids;
pub mod interests;
pub mod models;
pub mod snowflake;
pub mod tags;

pub use error::CoreError;
pub use ids::*;
pub use interests::{InterestDeltas, LIKE_WEIGHT, WATCH_WEIGHT};
pub use models::*;
pub use snowflake::SnowflakeGenerator;
