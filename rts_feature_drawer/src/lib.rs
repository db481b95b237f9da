/*!
# RTS Feature Drawer

Visibility culling, distance-based level-of-detail classification and batched
draw submission for map features (wreckage, rocks, tree objects) in a
real-time strategy renderer.

## Architecture

- **DrawQuadGrid**: 2D grid of draw quads over the map, one bin per model type
- **FeatureCuller**: marks every feature in the visible quads with a draw flag
- **FeatureBatcher**: submits features whose flag matches the running pass
- **FeatureTracker**: owns the live features and keeps the grid in sync
- **FeatureDrawer**: per-frame orchestration of update and render passes

Everything outside that core (GPU state, model geometry, impostors, fog,
grid traversal, decals) is reached through the traits in [`services`],
supplied to the drawer at construction.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod camera;
pub mod feature;
pub mod services;
pub mod drawer;

// Main rts namespace module
pub mod rts {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{FeatureDrawerConfig, ConfigSource, MapDims};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Feature data model
    pub mod feature {
        pub use crate::feature::*;
    }

    // External collaborators
    pub mod services {
        pub use crate::services::*;
    }

    // Drawing core
    pub use crate::drawer::FeatureDrawer;
    pub mod drawer {
        pub use crate::drawer::*;
    }
}

// Re-export math library at crate root
pub use glam;
