//! chromiumoxide による `BrowserDriver` 実装

mod driver;

pub use driver::ChromeDriver;
