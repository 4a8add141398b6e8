/// Batch entity module
pub mod batch;
/// Batch file entity module
pub mod batch_file;

pub use batch::Entity as Batch;
pub use batch_file::Entity as BatchFile;
