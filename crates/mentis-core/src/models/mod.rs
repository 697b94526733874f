pub mod batch;
pub mod finding;
pub mod instrument;
pub mod intermediate;
pub mod record;
pub mod report;
pub mod segment;
pub mod subject;
pub mod token;
