pub mod clock;
pub mod db;

pub use clock::SystemClock;
pub use db::DbAdapter;
