//! HTTP server module for the flight dashboard.
//!
//! Exposes the filter pipeline and dashboard views as a REST API; charts are
//! rendered by an external frontend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing into a FilterSpec                        │
//! │  - JSON / CSV responses                                   │
//! │  - CORS, compression, error mapping                       │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Filtering, aggregation, KPIs, sampling                 │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Source Layer (source/)                                   │
//! │  - DatasetCache over a RecordSource                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/health` | service and cache status |
//! | GET | `/v1/options` | filter option sets |
//! | GET | `/v1/dashboard` | KPIs and chart series |
//! | GET | `/v1/flights` | paginated table |
//! | GET | `/v1/flights/export` | CSV download |
//! | GET | `/v1/aggregate` | custom grouped summary |
//! | POST | `/v1/refresh` | reload from the source |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
