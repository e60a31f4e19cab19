pub mod belt;
pub mod body;
pub mod clock;
pub mod follow;
pub mod scene;
pub mod stepper;
pub mod time;
