//! Light sources for Phong shading
//!
//! One directional light plus up to [`MAX_POINT_LIGHTS`] point lights. Point
//! lights can be attached to a scene node so they follow it around.

use cgmath::{InnerSpace, Matrix4, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use crate::gfx::scene::graph::NodeId;

/// Point lights the shader has room for
pub const MAX_POINT_LIGHTS: usize = 3;

/// Infinitely distant light with a fixed direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    pub direction: [f32; 3],
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.07,
            diffuse_intensity: 0.2,
            direction: [0.0, 0.0, -1.0],
        }
    }
}

impl DirectionalLight {
    pub fn to_uniform(&self) -> DirectionalLightUniform {
        let direction = Vector3::from(self.direction);
        let direction = if direction.magnitude2() > f32::EPSILON {
            direction.normalize()
        } else {
            -Vector3::unit_z()
        };

        DirectionalLightUniform {
            colour: self.colour,
            ambient_intensity: self.ambient_intensity,
            direction: direction.into(),
            diffuse_intensity: self.diffuse_intensity,
        }
    }
}

/// Distance attenuation: `exponent * d^2 + linear * d + constant`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.6,
            linear: 0.3,
            exponent: 0.05,
        }
    }
}

impl Attenuation {
    /// Divisor applied to the light contribution at distance `d`
    pub fn factor(&self, d: f32) -> f32 {
        self.exponent * d * d + self.linear * d + self.constant
    }
}

/// Omnidirectional light with distance falloff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    /// Position in the anchor node's space, or world space without an anchor
    pub position: [f32; 3],
    pub attenuation: Attenuation,
    #[serde(skip)]
    pub anchor: Option<NodeId>,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            colour: [0.7, 0.7, 1.0],
            ambient_intensity: 1.3,
            diffuse_intensity: 1.0,
            position: [0.0, 0.0, 0.0],
            attenuation: Attenuation::default(),
            anchor: None,
        }
    }
}

impl PointLight {
    /// Attaches the light to a scene node
    pub fn with_anchor(mut self, node: NodeId) -> Self {
        self.anchor = Some(node);
        self
    }

    /// World position given the world matrices of the scene graph
    pub fn world_position(&self, world_matrices: &[Matrix4<f32>]) -> Point3<f32> {
        let local = Point3::from(self.position);
        match self.anchor.and_then(|node| world_matrices.get(node.index())) {
            Some(world) => world.transform_point(local),
            None => local,
        }
    }

    pub fn to_uniform(&self, world_position: Point3<f32>) -> PointLightUniform {
        PointLightUniform {
            colour: self.colour,
            ambient_intensity: self.ambient_intensity,
            position: world_position.into(),
            diffuse_intensity: self.diffuse_intensity,
            constant: self.attenuation.constant,
            linear: self.attenuation.linear,
            exponent: self.attenuation.exponent,
            _padding: 0.0,
        }
    }
}

/// GPU layout of a directional light. MUST match `DirectionalLight` in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniform {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub direction: [f32; 3],
    pub diffuse_intensity: f32,
}

/// GPU layout of a point light. MUST match `PointLight` in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub position: [f32; 3],
    pub diffuse_intensity: f32,
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
    _padding: f32,
}
