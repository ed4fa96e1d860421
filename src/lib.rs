pub mod inspector;
pub mod smoothed_follow;
pub mod utils;
pub mod vector_math;

pub mod prelude {
    pub use crate::smoothed_follow::{
        FollowPhase, FollowSystem, ResetFollowEvent, SmoothFollowPlugin, SmoothPositionFollow,
        SmoothRotationFollow, SmoothType,
    };
    pub use crate::vector_math;

    #[cfg(feature = "editor")]
    pub use crate::inspector::FollowInspectorPlugin;
}
