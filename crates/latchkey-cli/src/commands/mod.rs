pub mod init;
pub mod outputs;
pub mod synth;
