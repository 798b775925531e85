//! Static property tables: materials, building codes, reinforcement and soils

mod code;
mod material;
mod reinforcement;
mod soil;

pub use code::{BuildingCode, CodeProfile};
pub use material::{MaterialProfile, StructuralMaterial, REFERENCE_DENSITY};
pub use reinforcement::{Reinforcement, ReinforcementProfile};
pub use soil::SoilType;

/// Combined structural modifiers for one parameter set
#[derive(Debug, Clone, Copy)]
pub struct StructuralProperties {
    pub material: &'static MaterialProfile,
    pub code: &'static CodeProfile,
    pub reinforcement: &'static ReinforcementProfile,
}

impl StructuralProperties {
    pub fn new(
        material: StructuralMaterial,
        code: BuildingCode,
        reinforcement: Reinforcement,
    ) -> Self {
        Self {
            material: material.profile(),
            code: code.profile(),
            reinforcement: reinforcement.profile(),
        }
    }

    /// material × code × reinforcement stiffness
    pub fn stiffness_ratio(&self) -> f64 {
        self.material.stiffness_modifier
            * self.code.stiffness_modifier
            * self.reinforcement.stiffness_modifier
    }

    /// Fundamental period in seconds: the 0.1·N rule of thumb softened by stiffness
    pub fn fundamental_period(&self, num_floors: usize) -> f64 {
        0.1 * num_floors.max(1) as f64 / self.stiffness_ratio().max(1e-6).sqrt()
    }

    /// Effective damping ratio: material damping scaled by the code era
    pub fn effective_damping(&self) -> f64 {
        self.material.damping_ratio * self.code.damping_modifier
    }

    fn threshold_modifier(&self) -> f64 {
        self.code.collapse_threshold_modifier * self.reinforcement.collapse_threshold_modifier
    }

    /// Drift ratio at which the building collapses
    pub fn collapse_threshold(&self) -> f64 {
        self.material.collapse_threshold * self.threshold_modifier()
    }

    /// Drift ratio at which damage becomes visible
    pub fn damage_threshold(&self) -> f64 {
        self.material.damage_threshold * self.threshold_modifier()
    }

    /// Absolute roof displacement limit in cm
    pub fn displacement_limit(&self) -> f64 {
        self.material.displacement_limit * self.threshold_modifier()
    }

    /// Ground acceleration (g) the structure can take, empirical drift → PGA conversion
    pub fn pga_limit(&self) -> f64 {
        self.collapse_threshold() * 15.0
    }
}
