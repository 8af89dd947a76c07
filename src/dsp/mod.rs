pub mod doppler;
pub mod harmonics;
