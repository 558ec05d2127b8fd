//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod sensor;
pub mod stepper;

pub use display::{CharDisplay, DisplayError, LCD_COLS, LCD_ROWS};
pub use sensor::{Level, LightSensor};
pub use stepper::{CoilDriver, HALF_STEP_PHASES};
