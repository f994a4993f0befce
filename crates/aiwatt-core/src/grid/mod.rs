//! Grid carbon intensity: the dataset, region normalisation and resolution precedence.

mod dataset;
mod region;
mod resolver;

pub use dataset::GridIntensityDataset;
pub use region::{alias_target, normalize_region};
pub(crate) use resolver::PreResolved;
pub use resolver::{
    resolve_grid_intensity, resolver_query, AsyncGridIntensityResolver, GridIntensity,
    GridIntensityResolver, IntensitySource, ResolverQuery,
};
