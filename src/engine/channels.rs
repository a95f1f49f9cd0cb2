//! Queues between a producer thread and the graph thread.
//!
//! Commands travel to the graph and events travel back, each over its own
//! `rtrb` single-producer single-consumer ring. Neither side ever blocks.

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::config::GraphConfig;

use super::commands::{GraphCommand, GraphEvent};

/// Default capacity of the command queue (producer -> graph).
pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 1024;

/// Default capacity of the event queue (graph -> producer).
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Creates a connected pair of handles with room for `command_capacity`
/// commands and `event_capacity` events.
pub fn channel(command_capacity: usize, event_capacity: usize) -> (ProducerHandle, GraphHandle) {
    let (command_tx, command_rx) = RingBuffer::new(command_capacity);
    let (event_tx, event_rx) = RingBuffer::new(event_capacity);
    (
        ProducerHandle {
            commands: command_tx,
            events: event_rx,
        },
        GraphHandle {
            commands: command_rx,
            events: event_tx,
            dropped_events: 0,
        },
    )
}

/// Like [`channel`], sized by `config`.
pub fn channel_from_config(config: &GraphConfig) -> (ProducerHandle, GraphHandle) {
    channel(config.command_capacity, config.event_capacity)
}

/// The producer's end: sends commands, receives events.
pub struct ProducerHandle {
    commands: Producer<GraphCommand>,
    events: Consumer<GraphEvent>,
}

impl ProducerHandle {
    /// Queues a command. A full queue hands the command back so the caller
    /// can retry once the graph has caught up.
    pub fn send_command(&mut self, command: GraphCommand) -> Result<(), GraphCommand> {
        match self.commands.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(command)) => Err(command),
        }
    }

    pub fn recv_event(&mut self) -> Option<GraphEvent> {
        self.events.pop().ok()
    }

    /// Every event published so far, oldest first.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        let mut events = Vec::with_capacity(self.events.slots());
        while let Some(event) = self.recv_event() {
            events.push(event);
        }
        events
    }
}

/// The graph thread's end: receives commands, publishes events.
///
/// Events are best effort. When the producer does not keep up, new events
/// are dropped and counted instead of stalling the graph.
pub struct GraphHandle {
    commands: Consumer<GraphCommand>,
    events: Producer<GraphEvent>,
    dropped_events: usize,
}

impl GraphHandle {
    pub fn recv_command(&mut self) -> Option<GraphCommand> {
        self.commands.pop().ok()
    }

    /// Publishes an event. Returns false if the queue was full and the event
    /// was dropped.
    pub fn send_event(&mut self, event: GraphEvent) -> bool {
        let sent = self.events.push(event).is_ok();
        if !sent {
            self.dropped_events += 1;
        }
        sent
    }

    /// Number of events dropped since the last call.
    pub fn take_dropped_events(&mut self) -> usize {
        std::mem::take(&mut self.dropped_events)
    }
}
