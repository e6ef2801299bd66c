//! Domain events emitted by chat sessions

mod domain_event;

pub use domain_event::{
    BubbleClearedEvent, HonkEvent, SessionClosedEvent, SlotResolvedEvent, TypingStartedEvent,
    TypingStoppedEvent,
};
