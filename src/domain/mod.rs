pub mod artist;
pub mod period;
pub mod release;
