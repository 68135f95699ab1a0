pub mod dates;
pub mod ports;
pub mod rental;
pub mod subscription;
