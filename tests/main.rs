/*!
 * Main test entry point for boardcast test suite
 */

// Import common test utilities
pub mod common;

// Import unit tests
mod unit {
    // File and folder related tests
    pub mod file_utils_tests;

    // App configuration tests
    pub mod app_config_tests;

    // Fragment splitting and matching tests
    pub mod fragment_matcher_tests;
}

// Import integration tests
mod integration {
    // End-to-end workflow tests
    pub mod pipeline_workflow_tests;
}
