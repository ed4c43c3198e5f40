// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene traversal: walks a subtree and feeds its visuals to the encoder.

use alloc::vec::Vec;

use stipple_core::bbox::BoundingBox;
use stipple_core::scene::{EntityId, SceneStore};
#[cfg(feature = "trace-rich")]
use stipple_core::trace::SubtreeCulledEvent;
use stipple_core::trace::Tracer;

use crate::camera::Camera;
use crate::encoder::CommandEncoder;
use crate::visual::{RenderView, Visual};

/// Encodes one frame of the subtree under `root` into `encoder`.
///
/// The encoder is cleared first. The frame is wrapped in the camera's
/// world-to-screen transform, and the encoder is finished afterwards, so
/// the resulting stream is complete and balanced.
///
/// Camera anchors in the subtree are applied before anything is culled, so
/// anchored entities are tested at their on-screen position.
pub fn encode_frame<C: Visual>(
    encoder: &mut CommandEncoder,
    scene: &mut SceneStore<C>,
    root: EntityId,
    camera: &Camera,
    cull_margin: f64,
    tracer: &mut Tracer<'_>,
    frame_index: u64,
) {
    encoder.clear();
    apply_anchors(scene, root, camera);

    let mut walk = Walk {
        encoder,
        camera,
        cull_box: camera.cull_box(cull_margin),
        tracer,
        frame_index,
    };
    walk.encoder.push_transform(&camera.world_to_screen());
    walk.visit(scene, root, 1.0);
    walk.encoder.pop_transform();
    walk.encoder.finish();
}

/// Writes camera-relative offsets into every anchored entity under `root`.
///
/// The setters only mark entities dirty when a value actually changes, so a
/// still camera costs nothing here.
pub fn apply_anchors<C>(scene: &mut SceneStore<C>, root: EntityId, camera: &Camera) {
    let mut stack: Vec<EntityId> = Vec::new();
    stack.push(root);
    while let Some(id) = stack.pop() {
        if let Some(anchor) = scene.anchor(id) {
            scene.set_position_offset(id, camera.anchor_offset(&anchor));
            scene.set_scale_mult(id, camera.anchor_scale(&anchor));
        }
        let mut child = scene.first_child(id);
        while let Some(c) = child {
            stack.push(c);
            child = scene.next_sibling(c);
        }
    }
}

struct Walk<'e, 'c, 't, 'a> {
    encoder: &'e mut CommandEncoder,
    camera: &'c Camera,
    cull_box: BoundingBox,
    tracer: &'t mut Tracer<'a>,
    frame_index: u64,
}

impl Walk<'_, '_, '_, '_> {
    fn visit<C: Visual>(&mut self, scene: &mut SceneStore<C>, id: EntityId, parent_opacity: f64) {
        if !scene.is_enabled(id) {
            return;
        }
        // Empty bounds intersect nothing, so contentless leaves go too.
        if !scene.bounding_box(id).intersects(&self.cull_box) {
            #[cfg(feature = "trace-rich")]
            self.tracer.subtree_culled(&SubtreeCulledEvent {
                frame_index: self.frame_index,
                entity_index: id.index(),
            });
            #[cfg(not(feature = "trace-rich"))]
            {
                _ = (&self.tracer, self.frame_index);
            }
            return;
        }

        let local = scene.local_matrix(id);
        self.encoder.push_transform(&local);

        let opacity = parent_opacity * scene.opacity(id);
        if !scene.components(id).is_empty() {
            self.encoder.set_opacity(opacity);
            let view = RenderView {
                camera: self.camera,
                content_bounds: scene.local_content_bounds(id, None),
            };
            for component in scene.components(id) {
                component.queue_render_commands(self.encoder, &view);
            }
        }

        let mut child = scene.first_child(id);
        while let Some(c) = child {
            self.visit(scene, c, opacity);
            child = scene.next_sibling(c);
        }

        self.encoder.pop_transform();
    }
}
