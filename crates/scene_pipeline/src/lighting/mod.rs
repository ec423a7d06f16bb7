//! Scene lighting: two directional slots plus pooled point lights

mod directional_light;
mod point_light;

pub use directional_light::{DirectionalLight, DirectionalLightInfo};
pub use point_light::{
    PointLight, PointLightConstants, PointLightHandle, PointLightManager, MAX_POINT_LIGHTS_PER_OBJECT,
};
