pub mod configuration;
pub mod history_record;
pub mod release;
