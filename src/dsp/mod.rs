pub mod applier;
pub mod bank;
pub mod common;
pub mod compressor;
pub mod detector;
pub mod gain_computer;
pub mod limiter;

pub use bank::{ChannelMode, CompressorBank};
pub use compressor::Compressor;

// The core trait for anything that processes audio one sample at a time
pub trait Stage: Send + Sync + 'static {
    // Process a single sample through this stage
    fn process(&mut self, input: f32) -> f32;

    // Process a block of samples through this stage
    fn process_block(&mut self, input: &mut [f32]) {
        for sample in input.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    // Set a parameter value by name
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), &'static str>;

    // Get a parameter value by name
    fn get_parameter(&self, name: &str) -> Result<f32, &'static str>;
}
