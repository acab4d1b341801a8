pub mod batch_runner;
pub mod progress;
pub mod store_scraper;

pub use batch_runner::*;
pub use progress::*;
pub use store_scraper::*;
