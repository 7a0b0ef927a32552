// Communication channels, lock-free

use crate::messaging::command::Command;
use crate::remote::RemoteEvent;
use ringbuf::{traits::Split, HeapRb};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

/// Channel carrying shell commands (input events, volume, toggles) into the
/// session pump.
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type RemoteProducer = ringbuf::HeapProd<RemoteEvent>;
pub type RemoteConsumer = ringbuf::HeapCons<RemoteEvent>;

/// Channel carrying the remote event stream into the orchestra queue. The
/// consumer never flow-controls the producer; overload is handled by the
/// queue's drain policy.
pub fn create_remote_channel(capacity: usize) -> (RemoteProducer, RemoteConsumer) {
    let rb = HeapRb::<RemoteEvent>::new(capacity);
    rb.split()
}
