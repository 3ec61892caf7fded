pub mod red_flags;
pub mod trajectory;
pub mod value_creation;

pub use red_flags::{detect_red_flags, RedFlag, RedFlagReport, RedFlagStatus, Severity};
pub use trajectory::{calculate_trajectory, EarningPowerTrajectory, Quadrant, TrajectoryPattern};
pub use value_creation::{calculate_value_creation, ValueCreationTest, ValueMeasure};
