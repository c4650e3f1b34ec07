use std::ops::Index;

/// Fixed-length tuple of `f32` components.
///
/// Equality is exact component-wise float equality: `0.0 == -0.0` holds and a
/// NaN component never compares equal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vector<const N: usize>([f32; N]);

pub type Vec2 = Vector<2>;
pub type Vec3 = Vector<3>;

/// Interleaved render vertex: position (3), uv (2), normal (3).
pub type RenderVertex = Vector<8>;
/// Position-only collision vertex.
pub type CollisionVertex = Vector<3>;

impl<const N: usize> Vector<N> {
    pub const fn new(components: [f32; N]) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f32; N] {
        &self.0
    }

    /// Hashable key that agrees with `==`.
    ///
    /// Negative zero is folded onto positive zero. Returns `None` when any
    /// component is NaN, since such a vector equals nothing, itself included.
    pub fn exact_key(&self) -> Option<[u32; N]> {
        if self.0.iter().any(|c| c.is_nan()) {
            return None;
        }
        Some(self.0.map(|c| if c == 0.0 { 0 } else { c.to_bits() }))
    }
}

impl<const N: usize> From<[f32; N]> for Vector<N> {
    fn from(components: [f32; N]) -> Self {
        Self(components)
    }
}

impl<const N: usize> Index<usize> for Vector<N> {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

impl RenderVertex {
    pub fn interleave(position: &Vec3, uv: &Vec2, normal: &Vec3) -> Self {
        let [px, py, pz] = position.0;
        let [u, v] = uv.0;
        let [nx, ny, nz] = normal.0;
        Self([px, py, pz, u, v, nx, ny, nz])
    }
}
