pub mod budget;
pub mod capture;
pub mod extractor;
pub mod fetcher;
pub mod merge;
pub mod normalize;
pub mod pattern;
pub mod report;
pub mod router;
pub mod run;
pub mod scheduler;
pub mod sources;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
