#![no_std]

//! ESP32-S3 adapters for the tiltlink core seams.

pub mod network;
pub mod sensor;
