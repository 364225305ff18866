pub mod avb_scheduler;
pub mod cycle_control;
pub mod integer_program;
pub mod reservation;
pub mod tt_scheduler;

pub use avb_scheduler::AvbScheduler;
pub use cycle_control::{CycleAction, CycleAdjustment};
pub use integer_program::{ClosedFormSolver, IntegerProgramSolver, SingleVariableProgram, SolveStatus};
pub use tt_scheduler::TtScheduler;
