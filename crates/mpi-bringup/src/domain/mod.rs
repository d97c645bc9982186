pub mod bringup;
