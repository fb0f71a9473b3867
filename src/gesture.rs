use crate::config::GestureConfig;

/// Which kind of pointer is driving a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Touch,
    Mouse,
}

/// A pointer event reduced to what the tracker cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Start(f64),
    Move(f64),
    End,
    /// The pointer left the interactive surface.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affordance {
    #[default]
    Neutral,
    Like,
    Dislike,
}

impl Affordance {
    pub fn for_choice(liked: bool) -> Self {
        if liked {
            Self::Like
        } else {
            Self::Dislike
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    source: PointerSource,
    origin_x: f64,
    current_x: f64,
}

impl DragState {
    fn delta(&self) -> f64 {
        self.current_x - self.origin_x
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Event did not belong to an active gesture.
    Ignored,
    Tracking {
        translate_x: f64,
        rotate_deg: f64,
        affordance: Affordance,
        /// The platform's scroll/selection default should be prevented.
        suppress_default: bool,
    },
    Commit {
        liked: bool,
    },
    Cancel,
}

/// Turns touch and mouse drags into live feedback and a final decision.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    drag: Option<DragState>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, drag: None }
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    pub fn reset(&mut self) {
        self.drag = None;
    }

    pub fn handle(&mut self, source: PointerSource, input: PointerInput) -> GestureOutcome {
        match input {
            PointerInput::Start(x) => self.start(source, x),
            PointerInput::Move(x) => self.track(source, x),
            PointerInput::End => self.finish(source),
            PointerInput::Leave => self.leave(source),
        }
    }

    fn start(&mut self, source: PointerSource, x: f64) -> GestureOutcome {
        if self.drag.is_some() {
            return GestureOutcome::Ignored;
        }
        self.drag = Some(DragState {
            source,
            origin_x: x,
            current_x: x,
        });
        GestureOutcome::Tracking {
            translate_x: 0.0,
            rotate_deg: 0.0,
            affordance: Affordance::Neutral,
            // Mouse-down would otherwise start text or image selection.
            suppress_default: source == PointerSource::Mouse,
        }
    }

    fn track(&mut self, source: PointerSource, x: f64) -> GestureOutcome {
        let Some(drag) = self.drag.as_mut() else {
            return GestureOutcome::Ignored;
        };
        if drag.source != source {
            return GestureOutcome::Ignored;
        }
        drag.current_x = x;
        let delta = drag.delta();

        GestureOutcome::Tracking {
            translate_x: delta,
            rotate_deg: delta / self.config.rotation_divisor,
            affordance: self.classify(delta),
            suppress_default: source == PointerSource::Touch
                && delta.abs() > self.config.scroll_lock_threshold,
        }
    }

    fn finish(&mut self, source: PointerSource) -> GestureOutcome {
        match self.drag {
            Some(drag) if drag.source == source => {
                self.drag = None;
                let delta = drag.delta();
                if delta > self.config.commit_threshold {
                    GestureOutcome::Commit { liked: true }
                } else if delta < -self.config.commit_threshold {
                    GestureOutcome::Commit { liked: false }
                } else {
                    GestureOutcome::Cancel
                }
            }
            _ => GestureOutcome::Ignored,
        }
    }

    fn leave(&mut self, source: PointerSource) -> GestureOutcome {
        match self.drag {
            Some(drag) if drag.source == source => {
                self.drag = None;
                GestureOutcome::Cancel
            }
            _ => GestureOutcome::Ignored,
        }
    }

    fn classify(&self, delta: f64) -> Affordance {
        if delta > self.config.affordance_threshold {
            Affordance::Like
        } else if delta < -self.config.affordance_threshold {
            Affordance::Dislike
        } else {
            Affordance::Neutral
        }
    }
}
