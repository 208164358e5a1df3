//! Background loops.

pub mod session_reaper_loop;
