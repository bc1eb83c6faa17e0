pub mod options;

pub use options::{parse_form_bool, parse_num_copies, ProcessRequest, UniqueizeOptions};
