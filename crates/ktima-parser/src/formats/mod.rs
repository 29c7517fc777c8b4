pub mod delimited;
pub mod xlsx;

pub use delimited::DelimitedReader;
pub use xlsx::XlsxReader;
