//! Small helpers shared by tests across the workspace.

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
