//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that drives [`AppService`] end to end
//! against mock adapters.  No broker and no files are involved.
//!
//! [`AppService`]: lockconsole::app::service::AppService

mod connection_tests;
mod enrollment_flow_tests;
mod mock_link;
mod unlock_log_tests;
