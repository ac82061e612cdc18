pub mod detection_loop;
pub mod loop_state;
pub mod scheduler;
