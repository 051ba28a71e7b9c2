pub mod controls;
pub mod events;
pub mod headless;
pub mod input_adapter;
pub mod object;
