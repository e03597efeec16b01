pub mod label_table;
pub mod region_classifier;
