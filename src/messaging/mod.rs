// Lock-free messaging between the input/UI shells and the core

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{
    create_command_channel, create_remote_channel, CommandConsumer, CommandProducer,
    RemoteConsumer, RemoteProducer,
};
pub use command::Command;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
