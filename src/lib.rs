pub mod logger;
pub mod microscopy;
