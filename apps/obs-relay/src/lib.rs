pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod surface;

pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use routes::{router, AppState};
pub use service::RelayService;
pub use surface::ObsSurface;
