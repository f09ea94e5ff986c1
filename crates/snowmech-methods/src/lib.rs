//! Snow mechanical parameter methods and the default engine wiring.
//!
//! This crate instantiates the generic snowmech engine for snow mechanics:
//! empirical regressions for layer parameters (density, elastic modulus,
//! Poisson's ratio, shear modulus), laminate plate-theory slab parameters
//! (A11, B11, D11, A55), the grain-form vocabulary tables, the default
//! dependency graph, and the registry binding it all together.
//!
//! ```no_run
//! use snowmech_engine::ExecutionConfig;
//! use snowmech_methods::{default_engine, ObservedLayer, slab_from_observations};
//!
//! let engine = default_engine();
//! let slab = slab_from_observations(
//!     vec![ObservedLayer {
//!         thickness_cm: Some(30.0),
//!         hand_hardness: Some("4F".into()),
//!         grain_form: Some("RG".into()),
//!         ..ObservedLayer::default()
//!     }],
//!     Some(35.0),
//! );
//! let results = engine
//!     .execute_all(&slab, "elastic_modulus", &ExecutionConfig::default())
//!     .unwrap();
//! println!("{}/{} pathways succeeded", results.successful, results.total);
//! ```

pub mod constants;
pub mod density;
pub mod elastic;
pub mod grain;
pub mod graph_def;
pub mod observations;
pub mod plate;
pub mod poisson;
pub mod registry_def;
pub mod shear;

pub use graph_def::default_graph;
pub use observations::{slab_from_observations, ObservedLayer};
pub use registry_def::{default_engine, default_registry};
