//! Integration test entry point

mod helpers;
mod test_release;
mod test_validate;
