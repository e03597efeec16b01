pub mod face_analyzer;
pub mod pipeline_config;
pub mod pipeline_controller;
pub mod pipeline_error;
pub mod pipeline_logger;
