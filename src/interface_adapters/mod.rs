// Interface adapters: HTTP clients, wire protocol and headless collaborators.

pub mod clients;
pub mod clock;
pub mod collaborators;
pub mod protocol;
