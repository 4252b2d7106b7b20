//! Void Physics - Rapier 2D/3D bridge
//!
//! Physics data components plus the two simulation worlds a scene drives
//! while it is running.
//!
//! # Features
//!
//! - 2D rigid bodies with box, circle and convex polygon fixtures (rapier2d)
//! - 3D rigid bodies with compound box/sphere/capsule/cylinder shapes (rapier3d)
//! - Distance, spring, hinge, slider and wheel joints between 2D bodies
//! - A 16-layer collision table owned by each scene
//! - Contact begin/end events tagged with entity UUIDs
//!
//! # Architecture
//!
//! ```text
//!   Scene components                 Runtime worlds
//! ┌─────────────────────┐        ┌──────────────────────┐
//! │ Rigidbody2DComponent│──────▶ │ PhysicsWorld2D       │
//! │ *Collider2DComponent│        │  bodies / colliders  │
//! ├─────────────────────┤        ├──────────────────────┤
//! │ RigidbodyComponent  │──────▶ │ PhysicsWorld3D       │
//! │ *ColliderComponent  │        │  bodies / colliders  │
//! └─────────────────────┘        └──────────────────────┘
//!            ▲                              │
//!            └──── transform read-back ─────┘
//! ```
//!
//! Worlds only exist between runtime start and stop; the components carry
//! `Option` runtime handles that are `None` the rest of the time.

pub mod body;
pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod joint;
pub mod layers;
pub mod world2d;
pub mod world3d;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{
        Body2DRuntime, Body3DRuntime, BodyHandle2D, BodyHandle3D, BodyType, Rigidbody2DComponent,
        RigidbodyComponent,
    };
    pub use crate::collider::{
        BoxCollider2DComponent, BoxColliderComponent, CapsuleColliderComponent,
        CircleCollider2DComponent, Collider2DDesc, Collider3DDesc, ColliderHandle2D,
        CylinderColliderComponent, PolygonCollider2DComponent, Shape2D, Shape3D,
        SphereColliderComponent,
    };
    pub use crate::config::PhysicsSettings;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{ContactEvent2D, ContactKind};
    pub use crate::joint::{
        DistanceJoint2DComponent, HingeJoint2DComponent, Joint2DDesc, JointHandle2D, JointKind2D,
        JointMotor, JointSpring, SliderJoint2DComponent, SpringJoint2DComponent,
        WheelJoint2DComponent,
    };
    pub use crate::layers::{CollisionFilter, LayerCollisionMask, LayerInfo};
    pub use crate::world2d::{BodyState2D, PhysicsWorld2D};
    pub use crate::world3d::{BodyState3D, PhysicsWorld3D};
}

pub use prelude::*;
