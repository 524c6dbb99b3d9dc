//! The six erosion pipeline passes
//!
//! One simulation step runs the passes in a fixed order:
//!
//! 1. Water     - rain deposits new water ([`step_water_cpu`])
//! 2. Flow      - surface gradient accelerates velocity ([`step_flow_cpu`])
//! 3. Erosion   - fast water dissolves terrain ([`step_erosion_cpu`])
//! 4. Transport - water and sediment advect along velocity ([`step_transport_cpu`])
//! 5. Deposition - oversaturated water drops sediment ([`step_deposition_cpu`])
//! 6. Evaporation - water decays toward dry ([`step_evaporation_cpu`])
//!
//! Each pass is a free function over field storage plus a parameter block,
//! mirroring the per-pass compute dispatches on the GPU side. The order and
//! the read/write sets of each pass are part of the validated contract;
//! reordering passes or fusing them changes captured metrics.

pub mod erosion;
pub mod flow;
pub mod transport;
pub mod water;

pub use erosion::{sediment_capacity, step_deposition_cpu, step_erosion_cpu};
pub use flow::step_flow_cpu;
pub use transport::step_transport_cpu;
pub use water::{step_evaporation_cpu, step_water_cpu};
