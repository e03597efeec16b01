pub mod blob;
pub mod inference_error;
pub mod inference_network;
pub mod model_set;
pub mod tensor_decoder;
