pub mod play;
pub mod train;

pub use play::{PlayConfig, PlayMode};
pub use train::{TrainConfig, TrainMode};
