pub use formica_core::{Result, SimError};
pub use formica_data::{EntityId, Transform, Vec2};

pub mod collider {
    pub use formica_core::collider::*;
}
pub mod config {
    pub use formica_core::config::*;
}
pub mod decay {
    pub use formica_core::decay::*;
}
pub mod economy {
    pub use formica_core::economy::*;
}
pub mod entity {
    pub use formica_core::entity::*;
}
pub mod metrics {
    pub use formica_core::metrics::*;
}
pub mod perception {
    pub use formica_core::perception::*;
}
pub mod state {
    pub use formica_core::state::*;
}
pub mod steering {
    pub use formica_core::steering::*;
}
pub mod world {
    pub use formica_core::world::*;
}
