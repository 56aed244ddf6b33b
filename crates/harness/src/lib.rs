mod db;
mod logging;

pub use db::TestDb;
pub use logging::init_test_logging;
