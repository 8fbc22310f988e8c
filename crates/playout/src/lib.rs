// playout
//
// Playback scheduling and timed overlays for a remotely controlled broadcast program.
// The remote software is reached only through the `ControlSurface` seam, and the
// scheduler cursor is persisted through `StateStore` so playback survives restarts.

mod error;
mod events;
mod overlay;
mod playlist;
mod presets;
mod scheduler;
mod store;
mod surface;

pub use error::{PlayoutError, Result, StoreError, SurfaceError};
pub use events::{FnListener, ListenerError, TrackChanged, TrackListener, TrackListeners};
pub use overlay::{OverlayConfig, OverlayConfigPatch, OverlayEvent, OverlayMode, OverlayPhase, OverlayReceipt, OverlaySequencer, OverlayStatus};
pub use playlist::{M3uParser, Playlist, PlaylistItem, PlaylistSummary, TrackMetadata};
pub use presets::{ActionResult, ActionStatus, PresetActivation, PresetActivator, SceneAction, ScenePreset};
pub use scheduler::{PersistedState, PlaylistScheduler, SchedulerStatus, ValidationReport, ValidationSummary, STATE_KEY};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use surface::{ControlSurface, MediaHook, SurfaceEvent, SurfaceMediaHook, SurfaceResult};
