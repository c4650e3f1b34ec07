use std::collections::BTreeMap;

use log::info;
use tsr3_core::{
    AttributeKind, CollisionVertex, ConvertError, ConvertResult, IndexedArray, RenderVertex, Vec2,
    Vec3,
};

use crate::reader::FaceCorner;

/// Turns geometry commands into submissions to the per-material render
/// arrays and the shared collision array.
#[derive(Debug, Default)]
pub struct MeshAssembler {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    materials: BTreeMap<String, IndexedArray<8>>,
    current_material: Option<String>,
    collision: IndexedArray<3>,
}

/// Everything the assembler accumulated over one parse pass.
#[derive(Debug, Default)]
pub struct AssembledMesh {
    pub materials: BTreeMap<String, IndexedArray<8>>,
    pub collision: IndexedArray<3>,
}

impl MeshAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_position(&mut self, position: Vec3) {
        self.positions.push(position);
    }

    pub fn push_uv(&mut self, uv: Vec2) {
        self.uvs.push(uv);
    }

    pub fn push_normal(&mut self, normal: Vec3) {
        self.normals.push(normal);
    }

    /// Makes `name` the target of following faces, creating its array on first use.
    pub fn select_material(&mut self, name: &str) {
        info!("Compiling material \"{}\"", name);
        if !self.materials.contains_key(name) {
            self.materials.insert(name.to_string(), IndexedArray::new());
        }
        self.current_material = Some(name.to_string());
    }

    pub fn current_material(&self) -> Option<&str> {
        self.current_material.as_deref()
    }

    /// Resolves a triangle's corners and submits them to the current material
    /// and to the collision mesh. Nothing is submitted if any corner fails.
    pub fn push_face(&mut self, corners: &[FaceCorner]) -> ConvertResult<()> {
        let name = self
            .current_material
            .as_deref()
            .ok_or(ConvertError::NoActiveMaterial)?;
        if corners.len() != 3 {
            return Err(ConvertError::UnsupportedFace { corners: corners.len() });
        }

        let mut resolved = Vec::with_capacity(3);
        for corner in corners {
            let position = resolve(&self.positions, corner.position, AttributeKind::Position)?;
            let uv = resolve(&self.uvs, corner.uv, AttributeKind::Uv)?;
            let normal = resolve(&self.normals, corner.normal, AttributeKind::Normal)?;
            resolved.push((position, uv, normal));
        }

        let render = self
            .materials
            .get_mut(name)
            .ok_or(ConvertError::NoActiveMaterial)?;
        for (position, uv, normal) in resolved {
            render.submit(RenderVertex::interleave(&position, &uv, &normal));
            self.collision.submit(CollisionVertex::from(*position.components()));
        }
        Ok(())
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn uv_count(&self) -> usize {
        self.uvs.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    pub fn finish(self) -> AssembledMesh {
        AssembledMesh {
            materials: self.materials,
            collision: self.collision,
        }
    }
}

/// Looks up a 1-based index; valid range is `1..=stream.len()`.
fn resolve<T: Copy>(stream: &[T], index: u64, kind: AttributeKind) -> ConvertResult<T> {
    let out_of_range = || ConvertError::IndexOutOfRange {
        kind,
        index,
        len: stream.len(),
    };
    let offset = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(out_of_range)?;
    stream.get(offset).copied().ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(position: u64, uv: u64, normal: u64) -> FaceCorner {
        FaceCorner { position, uv, normal }
    }

    fn unit_triangle() -> MeshAssembler {
        let mut asm = MeshAssembler::new();
        asm.push_position(Vec3::new([0.0, 0.0, 0.0]));
        asm.push_position(Vec3::new([1.0, 0.0, 0.0]));
        asm.push_position(Vec3::new([0.0, 1.0, 0.0]));
        asm.push_uv(Vec2::new([0.5, 0.5]));
        asm.push_normal(Vec3::new([0.0, 0.0, 1.0]));
        asm
    }

    #[test]
    fn face_without_material_fails() {
        let mut asm = unit_triangle();
        let err = asm
            .push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(3, 1, 1)])
            .unwrap_err();
        assert!(matches!(err, ConvertError::NoActiveMaterial));
    }

    #[test]
    fn triangle_fills_render_and_collision() {
        let mut asm = unit_triangle();
        asm.select_material("foo");
        asm.push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(3, 1, 1)])
            .expect("valid face");

        let mesh = asm.finish();
        let foo = &mesh.materials["foo"];
        assert_eq!(foo.vertex_count(), 3);
        assert_eq!(foo.indices(), &[0, 1, 2]);
        assert_eq!(
            foo.vertices()[1].components(),
            &[1.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0]
        );
        assert_eq!(mesh.collision.vertex_count(), 3);
        assert_eq!(mesh.collision.indices(), &[0, 1, 2]);
    }

    #[test]
    fn collision_spans_materials() {
        let mut asm = unit_triangle();
        asm.push_uv(Vec2::new([0.0, 1.0]));
        asm.select_material("a");
        asm.push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(3, 1, 1)])
            .expect("face a");
        asm.select_material("b");
        asm.push_face(&[corner(3, 2, 1), corner(2, 2, 1), corner(1, 2, 1)])
            .expect("face b");

        let mesh = asm.finish();
        assert_eq!(mesh.materials["a"].indices(), &[0, 1, 2]);
        assert_eq!(mesh.materials["b"].indices(), &[0, 1, 2]);
        assert_eq!(mesh.collision.vertex_count(), 3);
        assert_eq!(mesh.collision.indices(), &[0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn reselecting_material_appends() {
        let mut asm = unit_triangle();
        asm.select_material("a");
        asm.push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(3, 1, 1)])
            .expect("first");
        asm.select_material("b");
        asm.select_material("a");
        assert_eq!(asm.current_material(), Some("a"));
        asm.push_face(&[corner(1, 1, 1), corner(3, 1, 1), corner(2, 1, 1)])
            .expect("second");

        let mesh = asm.finish();
        assert_eq!(mesh.materials["a"].indices(), &[0, 1, 2, 0, 2, 1]);
        assert!(mesh.materials["b"].is_empty());
    }

    #[test]
    fn position_index_bounds() {
        let mut asm = unit_triangle();
        asm.select_material("m");

        for bad in [0, 4] {
            let err = asm
                .push_face(&[corner(1, 1, 1), corner(bad, 1, 1), corner(3, 1, 1)])
                .unwrap_err();
            match err {
                ConvertError::IndexOutOfRange { kind, index, len } => {
                    assert_eq!(kind, AttributeKind::Position);
                    assert_eq!(index, bad);
                    assert_eq!(len, 3);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        // the last element is addressable
        asm.push_face(&[corner(3, 1, 1), corner(3, 1, 1), corner(3, 1, 1)])
            .expect("index equal to stream length");
    }

    #[test]
    fn uv_and_normal_bounds() {
        let mut asm = unit_triangle();
        asm.select_material("m");

        let err = asm
            .push_face(&[corner(1, 2, 1), corner(2, 1, 1), corner(3, 1, 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::IndexOutOfRange { kind: AttributeKind::Uv, index: 2, len: 1 }
        ));

        let err = asm
            .push_face(&[corner(1, 1, 1), corner(2, 1, 0), corner(3, 1, 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::IndexOutOfRange { kind: AttributeKind::Normal, index: 0, .. }
        ));
    }

    #[test]
    fn failed_face_submits_nothing() {
        let mut asm = unit_triangle();
        asm.select_material("m");
        assert!(asm
            .push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(9, 1, 1)])
            .is_err());

        let mesh = asm.finish();
        assert!(mesh.materials["m"].is_empty());
        assert!(mesh.collision.is_empty());
    }

    #[test]
    fn quads_are_rejected() {
        let mut asm = unit_triangle();
        asm.push_position(Vec3::new([1.0, 1.0, 0.0]));
        asm.select_material("m");
        let err = asm
            .push_face(&[corner(1, 1, 1), corner(2, 1, 1), corner(4, 1, 1), corner(3, 1, 1)])
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFace { corners: 4 }));
    }
}
