pub mod map_commands;
pub mod packet;
