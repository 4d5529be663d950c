mod format_tests;
mod process_tests;
