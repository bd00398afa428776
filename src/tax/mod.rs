pub mod amount;
pub mod currency;
pub mod document;
pub mod lenient;
pub mod parser;
pub mod reconciler;
pub mod report;
pub mod summary;
