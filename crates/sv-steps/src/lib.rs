pub mod assertions;
pub mod collections;
pub mod error;
pub mod files;
pub mod generators;
pub mod table;
pub mod variables;

pub use assertions::{
    assert_empty, assert_not_empty, assert_not_null, assert_null, assert_text, TextCheck,
};
pub use collections::{
    split_into_sequence, store_element_at, store_mapping, store_random_element,
    store_random_value, store_sequence, store_typed_sequence, store_value_by_key,
};
pub use error::StepError;
pub use files::{
    assert_files_exist, create_files, store_file_content, write_variable_to_file, FileProvider,
    FileSpec, LocalFileProvider, USER_DIR_VARIABLE,
};
pub use generators::{
    format_instant, store_current_date, store_date, store_datetime, store_random_date,
    store_random_email, store_random_ip, store_random_month, store_random_phone,
    store_random_text, store_random_url, store_random_weekday, store_shifted_date, store_time,
    store_uuid, CharSet, DataGenerator, DateParts, SeededGenerator, Shift, ShiftDirection,
    TimeParts, PHONE_MASK_DIGIT,
};
pub use table::StepTable;
pub use variables::{
    change_variable, copy_text, copy_value, delete_variable, empty_variable,
    store_multiline_text, store_number, store_text, store_xml_text, substitute_variable,
};
