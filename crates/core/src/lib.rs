pub mod annotation;
pub mod classification;
pub mod detection;
pub mod inference;
pub mod pipeline;
pub mod shared;
pub mod video;

#[cfg(test)]
mod test_support;
