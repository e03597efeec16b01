pub mod ffmpeg_source;
pub mod image_file_source;
pub mod image_sequence_sink;
pub mod null_sink;
pub mod video_file_sink;
