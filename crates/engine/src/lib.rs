pub mod animation;
pub mod config;
pub mod engine;
pub mod events;
pub mod pick;
pub mod platform;

pub use animation::{PulseAnimator, PulseState, PulseTick};
pub use config::{ConfigError, EngineConfig, PulseConfig, TierProfile};
pub use engine::MapEngine;
pub use events::EngineEvent;
pub use pick::{
    CountryClick, CountryIndex, Dispatch, PickHit, PickResult, PickedObject, PopupData, PopupKind,
    PopupRequest,
};
pub use platform::{NoSignals, PlatformSignal, PlatformSignals, QueuedSignals};
