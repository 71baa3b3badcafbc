//! Farm-management agents.
//!
//! Four capability agents ([`ClimateMonitor`], [`CropAnalyzer`],
//! [`WaterOptimizer`], [`YieldPredictor`]) are thin declarations over the
//! shared [`OperationExecutor`]. [`FarmManager`] owns them and adds the
//! routed free-form query plus the farm-wide operations.
//!
//! Every operation returns a [`ResponseEnvelope`]; generation failures are
//! error envelopes, while malformed requests are [`OperationError`]s.

pub mod climate;
pub mod crop;
pub mod envelope;
pub mod farm_manager;
pub mod identity;
pub mod media;
pub mod operation;
pub mod water;
pub mod yield_predictor;

pub use climate::ClimateMonitor;
pub use crop::CropAnalyzer;
pub use envelope::{Fields, Outcome, ResponseEnvelope};
pub use farm_manager::{COORDINATE_OPERATION, FarmManager, RoutingDecision, agent_catalogue};
pub use identity::AgentIdentity;
pub use media::{ImageSource, image_part};
pub use operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
pub use water::WaterOptimizer;
pub use yield_predictor::YieldPredictor;
