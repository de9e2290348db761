//! # Soil and Field Test Models
//!
//! - [`SoilProfile`] / [`SoilLayer`]: layered soil column and stress engine
//! - [`Spt`]: Standard Penetration Test boreholes with [`NValue`] blow counts
//! - [`Cpt`]: Cone Penetration Test soundings
//! - [`Masw`]: surface wave velocity profiles
//! - [`PointLoadTest`]: rock core point load samples
//!
//! Every test type follows the same shape: a record, an experiment holding
//! depth-ordered records, and a collection of experiments with an
//! idealization rule.

pub mod cpt;
pub mod masw;
pub mod n_value;
pub mod point_load;
pub mod soil_profile;
pub mod spt;

pub use cpt::{Cpt, CptExp, CptField, CptLayer};
pub use masw::{Masw, MaswExp, MaswField, MaswLayer};
pub use n_value::{NValue, REFUSAL_BLOW_COUNT};
pub use point_load::{PointLoadExp, PointLoadField, PointLoadSample, PointLoadTest};
pub use soil_profile::{SoilLayer, SoilLayerField, SoilProfile, WATER_UNIT_WEIGHT};
pub use spt::{Spt, SptBlow, SptExp, SptField};
