mod builders;
mod capture_files;
mod records;

pub use builders::*;
pub use capture_files::*;
pub use records::*;
