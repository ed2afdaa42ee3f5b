//! Gesture-to-transform mapping.
//!
//! Each layer runs up to three independent channels (drag, rotate, pinch).
//! Starting a channel snapshots the layer's committed values; every change
//! recomputes the live value from that snapshot; ending the channel commits
//! the live value. Snapshots are keyed by layer, so gestures on different
//! layers never see each other's state.

use std::collections::HashMap;

use mememaker_common::error::{MemeError, MemeResult};
use mememaker_meme_model::geometry::{
    apply_drag_delta, apply_rotation_delta, apply_scale_delta, CanvasSize, Offset,
};
use mememaker_meme_model::layer::{Layer, LayerId};

/// One of the simultaneous gesture streams a layer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GestureChannel {
    Drag,
    Rotate,
    Pinch,
}

/// A gesture phase callback as delivered by the UI event loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Began(GestureChannel),
    /// Total translation since the drag began.
    DragChanged { translation: Offset },
    /// Total angle swept since the twist began, in degrees.
    RotateChanged { degrees: f64 },
    /// Magnification since the pinch began (1.0 = unchanged).
    PinchChanged { factor: f64 },
    Ended(GestureChannel),
    /// Abandon every active channel on the layer and restore its snapshot.
    Cancelled,
}

/// Whether a layer is holding uncommitted gesture values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Interacting,
}

/// Committed values captured when a channel began.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChannelSnapshot {
    Drag { committed_offset: Offset },
    Rotate { base_degrees: f64 },
    Pinch { base_width: f64, base_height: f64 },
}

/// Transient gesture state for every layer currently being touched.
#[derive(Debug, Default)]
pub struct GestureMapper {
    snapshots: HashMap<(LayerId, GestureChannel), ChannelSnapshot>,
}

impl GestureMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, layer: LayerId) -> InteractionState {
        if self.snapshots.keys().any(|(id, _)| *id == layer) {
            InteractionState::Interacting
        } else {
            InteractionState::Idle
        }
    }

    /// Channels currently active on `layer`, in drag/rotate/pinch order.
    pub fn active_channels(&self, layer: LayerId) -> Vec<GestureChannel> {
        let mut channels: Vec<_> = self
            .snapshots
            .keys()
            .filter(|(id, _)| *id == layer)
            .map(|(_, channel)| *channel)
            .collect();
        channels.sort();
        channels
    }

    /// Whether no layer is mid-gesture.
    pub fn is_idle(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Center a layer that has never been positioned and commit that
    /// position. Returns whether the layer moved.
    pub fn ensure_positioned<L: Layer + ?Sized>(&self, layer: &mut L, canvas: CanvasSize) -> bool {
        if layer.transform().is_positioned() {
            return false;
        }
        layer.transform_mut().center_in(canvas);
        tracing::debug!(layer = %layer.id(), "Centered unpositioned layer");
        true
    }

    /// Snapshot the committed state for `channel`. Beginning a channel that
    /// is already active keeps the original snapshot.
    pub fn begin<L: Layer + ?Sized>(&mut self, layer: &L, channel: GestureChannel) {
        let t = layer.transform();
        self.snapshots
            .entry((layer.id(), channel))
            .or_insert_with(|| match channel {
                GestureChannel::Drag => ChannelSnapshot::Drag {
                    committed_offset: t.initial_offset,
                },
                GestureChannel::Rotate => ChannelSnapshot::Rotate {
                    base_degrees: t.rotation_degrees,
                },
                GestureChannel::Pinch => ChannelSnapshot::Pinch {
                    base_width: t.original_width,
                    base_height: t.original_height,
                },
            });
    }

    /// Move the layer to its committed offset plus `translation`.
    pub fn drag_changed<L: Layer + ?Sized>(
        &mut self,
        layer: &mut L,
        translation: Offset,
    ) -> MemeResult<()> {
        if !translation.is_finite() {
            return Err(MemeError::invalid_gesture("drag translation must be finite"));
        }
        if let ChannelSnapshot::Drag { committed_offset } =
            self.snapshot(layer, GestureChannel::Drag)
        {
            layer.transform_mut().offset = apply_drag_delta(committed_offset, translation);
        }
        Ok(())
    }

    /// Turn the layer to its starting rotation plus `degrees`.
    pub fn rotate_changed<L: Layer + ?Sized>(
        &mut self,
        layer: &mut L,
        degrees: f64,
    ) -> MemeResult<()> {
        if !degrees.is_finite() {
            return Err(MemeError::invalid_gesture("rotation angle must be finite"));
        }
        if let ChannelSnapshot::Rotate { base_degrees } =
            self.snapshot(layer, GestureChannel::Rotate)
        {
            layer.transform_mut().rotation_degrees = apply_rotation_delta(base_degrees, degrees);
        }
        Ok(())
    }

    /// Resize the layer to its starting size times `factor`.
    pub fn pinch_changed<L: Layer + ?Sized>(&mut self, layer: &mut L, factor: f64) -> MemeResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(MemeError::invalid_gesture(format!(
                "pinch factor must be positive, got {factor}"
            )));
        }
        if let ChannelSnapshot::Pinch {
            base_width,
            base_height,
        } = self.snapshot(layer, GestureChannel::Pinch)
        {
            let (width, height) = apply_scale_delta(base_width, base_height, factor);
            let t = layer.transform_mut();
            t.width = width;
            t.height = height;
            t.scale = factor;
            layer.scale_content(factor);
        }
        Ok(())
    }

    /// Commit the live value of `channel`. Returns false if the channel was
    /// not active on this layer.
    pub fn end<L: Layer + ?Sized>(&mut self, layer: &mut L, channel: GestureChannel) -> bool {
        if self.snapshots.remove(&(layer.id(), channel)).is_none() {
            return false;
        }

        let t = layer.transform_mut();
        match channel {
            GestureChannel::Drag => t.initial_offset = t.offset,
            GestureChannel::Rotate => {}
            GestureChannel::Pinch => {
                t.original_width = t.width;
                t.original_height = t.height;
                t.scale = 1.0;
                layer.commit_content_scale();
            }
        }

        let t = layer.transform();
        tracing::debug!(
            layer = %layer.id(),
            ?channel,
            x = t.offset.width,
            y = t.offset.height,
            rotation = t.rotation_degrees,
            width = t.width,
            height = t.height,
            "Gesture committed"
        );
        true
    }

    /// Roll every active channel on the layer back to its snapshot.
    pub fn cancel<L: Layer + ?Sized>(&mut self, layer: &mut L) {
        let id = layer.id();
        let mut restored = Vec::new();
        self.snapshots.retain(|(layer_id, _), snapshot| {
            if *layer_id == id {
                restored.push(*snapshot);
                false
            } else {
                true
            }
        });

        for snapshot in restored {
            let t = layer.transform_mut();
            match snapshot {
                ChannelSnapshot::Drag { committed_offset } => t.offset = committed_offset,
                ChannelSnapshot::Rotate { base_degrees } => t.rotation_degrees = base_degrees,
                ChannelSnapshot::Pinch {
                    base_width,
                    base_height,
                } => {
                    t.width = base_width;
                    t.height = base_height;
                    t.scale = 1.0;
                    layer.scale_content(1.0);
                }
            }
        }
    }

    /// Drop any snapshots for a layer that no longer exists.
    pub fn forget(&mut self, layer: LayerId) {
        self.snapshots.retain(|(id, _), _| *id != layer);
    }

    /// Dispatch one gesture event.
    pub fn apply<L: Layer + ?Sized>(
        &mut self,
        layer: &mut L,
        event: GestureEvent,
    ) -> MemeResult<InteractionState> {
        match event {
            GestureEvent::Began(channel) => self.begin(layer, channel),
            GestureEvent::DragChanged { translation } => self.drag_changed(layer, translation)?,
            GestureEvent::RotateChanged { degrees } => self.rotate_changed(layer, degrees)?,
            GestureEvent::PinchChanged { factor } => self.pinch_changed(layer, factor)?,
            GestureEvent::Ended(channel) => {
                self.end(layer, channel);
            }
            GestureEvent::Cancelled => self.cancel(layer),
        }
        Ok(self.state(layer.id()))
    }

    /// The snapshot for a channel, beginning it first when the UI reported a
    /// change without a start.
    fn snapshot<L: Layer + ?Sized>(&mut self, layer: &L, channel: GestureChannel) -> ChannelSnapshot {
        self.begin(layer, channel);
        self.snapshots[&(layer.id(), channel)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mememaker_meme_model::bitmap::Bitmap;
    use mememaker_meme_model::color::ColorComponents;
    use mememaker_meme_model::layer::{ImageLayer, TextLayer};
    use proptest::prelude::*;

    fn image_layer_at(x: f64, y: f64) -> ImageLayer {
        let mut layer = ImageLayer::new(Bitmap::from_raw(vec![0]), 80.0, 80.0);
        layer.transform.place_at(Offset::new(x, y));
        layer
    }

    fn text_layer() -> TextLayer {
        let mut layer = TextLayer::new("hi", ColorComponents::BLACK, "Arial", 20.0, 200.0, 50.0);
        layer.transform.place_at(Offset::new(10.0, 10.0));
        layer
    }

    fn drag(mapper: &mut GestureMapper, layer: &mut ImageLayer, dx: f64, dy: f64) {
        mapper.begin(&*layer, GestureChannel::Drag);
        mapper
            .drag_changed(layer, Offset::new(dx / 2.0, dy / 2.0))
            .unwrap();
        mapper.drag_changed(layer, Offset::new(dx, dy)).unwrap();
        assert!(mapper.end(layer, GestureChannel::Drag));
    }

    #[test]
    fn test_drag_changes_are_live_until_end() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(60.0, 160.0);

        mapper.begin(&layer, GestureChannel::Drag);
        mapper
            .drag_changed(&mut layer, Offset::new(5.0, -5.0))
            .unwrap();
        mapper
            .drag_changed(&mut layer, Offset::new(10.0, -20.0))
            .unwrap();

        assert_eq!(layer.transform.offset, Offset::new(70.0, 140.0));
        assert_eq!(layer.transform.initial_offset, Offset::new(60.0, 160.0));
        assert_eq!(mapper.state(layer.id), InteractionState::Interacting);

        mapper.end(&mut layer, GestureChannel::Drag);
        assert_eq!(layer.transform.initial_offset, Offset::new(70.0, 140.0));
        assert_eq!(mapper.state(layer.id), InteractionState::Idle);
    }

    #[test]
    fn test_two_drags_compose() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(60.0, 160.0);

        drag(&mut mapper, &mut layer, 10.0, 5.0);
        drag(&mut mapper, &mut layer, -3.0, 7.0);

        assert_eq!(layer.transform.offset, Offset::new(67.0, 172.0));
        assert_eq!(layer.transform.initial_offset, Offset::new(67.0, 172.0));
    }

    #[test]
    fn test_rotation_replaces_live_angle_from_gesture_start() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(1.0, 1.0);
        layer.transform.rotation_degrees = 30.0;

        mapper.rotate_changed(&mut layer, 10.0).unwrap();
        mapper.rotate_changed(&mut layer, 25.0).unwrap();
        assert_eq!(layer.transform.rotation_degrees, 55.0);

        mapper.end(&mut layer, GestureChannel::Rotate);
        mapper.rotate_changed(&mut layer, -60.0).unwrap();
        mapper.end(&mut layer, GestureChannel::Rotate);
        assert!((layer.transform.rotation_degrees - 355.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rotation_delta_is_identity() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(1.0, 1.0);
        layer.transform.rotation_degrees = 123.0;

        for _ in 0..5 {
            mapper.rotate_changed(&mut layer, 0.0).unwrap();
        }
        mapper.end(&mut layer, GestureChannel::Rotate);
        assert_eq!(layer.transform.rotation_degrees, 123.0);
    }

    #[test]
    fn test_pinch_commits_size_and_resets_scale() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(0.5, 0.5);

        mapper.pinch_changed(&mut layer, 2.0).unwrap();
        mapper.pinch_changed(&mut layer, 1.5).unwrap();
        assert_eq!(layer.transform.width, 120.0);
        assert_eq!(layer.transform.scale, 1.5);
        assert_eq!(layer.transform.original_width, 80.0);

        mapper.end(&mut layer, GestureChannel::Pinch);
        assert_eq!(layer.transform.width, 120.0);
        assert_eq!(layer.transform.original_width, 120.0);
        assert_eq!(layer.transform.scale, 1.0);
        assert!(layer.transform.is_at_rest());

        // the next pinch starts from the committed size
        mapper.pinch_changed(&mut layer, 0.5).unwrap();
        mapper.end(&mut layer, GestureChannel::Pinch);
        assert_eq!(layer.transform.width, 60.0);
        assert_eq!(layer.transform.height, 60.0);
    }

    #[test]
    fn test_pinch_scales_text_font() {
        let mut mapper = GestureMapper::new();
        let mut layer = text_layer();

        mapper.pinch_changed(&mut layer, 1.5).unwrap();
        assert_eq!(layer.font_size, 30.0);
        assert_eq!(layer.original_font_size, 20.0);
        assert_eq!(layer.transform.height, 75.0);

        mapper.end(&mut layer, GestureChannel::Pinch);
        assert_eq!(layer.original_font_size, 30.0);

        mapper.pinch_changed(&mut layer, 2.0).unwrap();
        assert_eq!(layer.font_size, 60.0);
    }

    #[test]
    fn test_invalid_pinch_is_rejected_without_touching_layer() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(3.0, 3.0);
        let before = layer.transform;

        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = mapper.pinch_changed(&mut layer, factor).unwrap_err();
            assert!(matches!(err, MemeError::InvalidGesture { .. }));
        }
        assert!(mapper
            .drag_changed(&mut layer, Offset::new(f64::NAN, 0.0))
            .is_err());
        assert!(mapper.rotate_changed(&mut layer, f64::INFINITY).is_err());
        assert_eq!(layer.transform, before);
    }

    #[test]
    fn test_simultaneous_channels_do_not_interact() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(100.0, 100.0);

        mapper
            .apply(&mut layer, GestureEvent::Began(GestureChannel::Drag))
            .unwrap();
        mapper
            .apply(&mut layer, GestureEvent::Began(GestureChannel::Rotate))
            .unwrap();
        mapper
            .apply(&mut layer, GestureEvent::Began(GestureChannel::Pinch))
            .unwrap();
        mapper
            .apply(
                &mut layer,
                GestureEvent::DragChanged {
                    translation: Offset::new(4.0, 4.0),
                },
            )
            .unwrap();
        mapper
            .apply(&mut layer, GestureEvent::RotateChanged { degrees: 90.0 })
            .unwrap();
        mapper
            .apply(&mut layer, GestureEvent::PinchChanged { factor: 2.0 })
            .unwrap();

        assert_eq!(
            mapper.active_channels(layer.id),
            vec![
                GestureChannel::Drag,
                GestureChannel::Rotate,
                GestureChannel::Pinch
            ]
        );
        assert_eq!(layer.transform.offset, Offset::new(104.0, 104.0));
        assert_eq!(layer.transform.rotation_degrees, 90.0);
        assert_eq!(layer.transform.width, 160.0);

        // ending the drag commits only the offset
        mapper
            .apply(&mut layer, GestureEvent::Ended(GestureChannel::Drag))
            .unwrap();
        assert_eq!(layer.transform.initial_offset, Offset::new(104.0, 104.0));
        assert_eq!(layer.transform.original_width, 80.0);

        let state = mapper
            .apply(&mut layer, GestureEvent::Ended(GestureChannel::Pinch))
            .unwrap();
        assert_eq!(state, InteractionState::Interacting);
        let state = mapper
            .apply(&mut layer, GestureEvent::Ended(GestureChannel::Rotate))
            .unwrap();
        assert_eq!(state, InteractionState::Idle);
        assert!(layer.transform.is_at_rest());
    }

    #[test]
    fn test_cancel_restores_snapshots() {
        let mut mapper = GestureMapper::new();
        let mut layer = text_layer();
        layer.transform.rotation_degrees = 15.0;
        let before = layer.clone();

        mapper
            .drag_changed(&mut layer, Offset::new(50.0, 50.0))
            .unwrap();
        mapper.rotate_changed(&mut layer, 45.0).unwrap();
        mapper.pinch_changed(&mut layer, 3.0).unwrap();
        assert_ne!(layer, before);

        mapper.apply(&mut layer, GestureEvent::Cancelled).unwrap();
        assert_eq!(layer, before);
        assert_eq!(mapper.state(layer.id), InteractionState::Idle);
    }

    #[test]
    fn test_layers_keep_independent_snapshots() {
        let mut mapper = GestureMapper::new();
        let mut a = image_layer_at(10.0, 10.0);
        let mut b = image_layer_at(500.0, 500.0);

        mapper.drag_changed(&mut a, Offset::new(1.0, 1.0)).unwrap();
        mapper.drag_changed(&mut b, Offset::new(-1.0, -1.0)).unwrap();
        mapper.drag_changed(&mut a, Offset::new(2.0, 2.0)).unwrap();
        mapper.end(&mut b, GestureChannel::Drag);

        assert_eq!(b.transform.initial_offset, Offset::new(499.0, 499.0));
        assert_eq!(a.transform.initial_offset, Offset::new(10.0, 10.0));
        assert_eq!(mapper.state(a.id), InteractionState::Interacting);

        mapper.end(&mut a, GestureChannel::Drag);
        assert_eq!(a.transform.initial_offset, Offset::new(12.0, 12.0));
        assert!(mapper.is_idle());
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let mut mapper = GestureMapper::new();
        let mut layer = image_layer_at(5.0, 5.0);
        layer.transform.offset = Offset::new(9.0, 9.0);
        assert!(!mapper.end(&mut layer, GestureChannel::Drag));
        assert_eq!(layer.transform.initial_offset, Offset::new(5.0, 5.0));
    }

    #[test]
    fn test_ensure_positioned_centers_only_unplaced_layers() {
        let mapper = GestureMapper::new();
        let canvas = CanvasSize::new(200.0, 400.0);

        let mut fresh = ImageLayer::new(Bitmap::from_raw(vec![0]), 80.0, 80.0);
        assert!(mapper.ensure_positioned(&mut fresh, canvas));
        assert_eq!(fresh.transform.initial_offset, Offset::new(60.0, 160.0));
        assert_eq!(fresh.transform.offset, Offset::new(60.0, 160.0));

        let mut placed = image_layer_at(1.0, 2.0);
        assert!(!mapper.ensure_positioned(&mut placed, canvas));
        assert_eq!(placed.transform.offset, Offset::new(1.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_scale_commit_matches_base_times_factor(
            w in 1.0f64..500.0, h in 1.0f64..500.0, factor in 0.05f64..10.0,
        ) {
            let mut mapper = GestureMapper::new();
            let mut layer = ImageLayer::new(Bitmap::from_raw(vec![0]), w, h);
            mapper.pinch_changed(&mut layer, factor).unwrap();
            mapper.end(&mut layer, GestureChannel::Pinch);

            prop_assert_eq!(layer.transform.width, w * factor);
            prop_assert_eq!(layer.transform.height, h * factor);
            prop_assert_eq!(layer.transform.scale, 1.0);
            prop_assert!(layer.transform.is_at_rest());
        }

        #[test]
        fn prop_drag_gestures_compose(
            dx1 in -1e3f64..1e3, dy1 in -1e3f64..1e3,
            dx2 in -1e3f64..1e3, dy2 in -1e3f64..1e3,
        ) {
            let mut mapper = GestureMapper::new();
            let mut layer = image_layer_at(60.0, 160.0);
            drag(&mut mapper, &mut layer, dx1, dy1);
            drag(&mut mapper, &mut layer, dx2, dy2);

            let expected = Offset::new(60.0 + dx1 + dx2, 160.0 + dy1 + dy2);
            prop_assert!((layer.transform.offset.width - expected.width).abs() < 1e-9);
            prop_assert!((layer.transform.offset.height - expected.height).abs() < 1e-9);
        }
    }
}
