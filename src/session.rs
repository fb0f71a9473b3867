use crate::config::SwipeConfig;
use crate::deck::{Deck, Summary};
use crate::gesture::{Affordance, GestureOutcome, GestureTracker, PointerInput, PointerSource};
use crate::source::ImageRef;
use log::{debug, error, info, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Presenting,
    Summary,
}

/// Progress of the card currently under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardStage {
    AwaitingImage,
    Ready,
    AnimatingCommit { liked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPose {
    Rest,
    /// Follows the pointer with no transition.
    Dragging { translate_x: f64, rotate_deg: f64 },
    /// Eases back to rest after a cancelled drag.
    Returning,
    /// Eases off-screen in the decided direction.
    Flung { liked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Loading,
    Progress { position: usize, total: usize },
    SkippedBroken,
    FetchFailed,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Loading => f.write_str("Loading cats…"),
            StatusLine::Progress { position, total } => write!(f, "Cat {} of {}", position, total),
            StatusLine::SkippedBroken => {
                f.write_str("Failed loading image, skipping to the next cat…")
            }
            StatusLine::FetchFailed => f.write_str(
                "Failed to load cats. Please check your connection and try again.",
            ),
        }
    }
}

#[derive(Debug)]
pub enum Action {
    /// Initialize, or restart from scratch.
    Start,
    BatchFetched {
        generation: u64,
        items: Vec<ImageRef>,
    },
    ImageSettled {
        generation: u64,
        cursor: usize,
        loaded: bool,
    },
    /// Discrete like/dislike from a button or the keyboard.
    Choose { liked: bool },
    Pointer {
        source: PointerSource,
        input: PointerInput,
    },
    CommitElapsed { generation: u64, cursor: usize },
}

/// Work the host must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchBatch {
        generation: u64,
        count: usize,
    },
    Preload(Vec<ImageRef>),
    LoadImage {
        generation: u64,
        cursor: usize,
        reference: ImageRef,
    },
    ScheduleCommit {
        generation: u64,
        cursor: usize,
        delay_ms: u32,
    },
    /// Prevent the browser default for the event being handled.
    SuppressDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCard {
    pub reference: ImageRef,
    pub position: usize,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub status: StatusLine,
    pub busy: bool,
    pub visible: Option<VisibleCard>,
    pub pose: CardPose,
    pub affordance: Affordance,
    pub input_enabled: bool,
    pub summary: Option<Summary>,
}

/// Maps a keyboard key to a like/dislike choice.
pub fn choice_for_key(key: &str) -> Option<bool> {
    match key {
        "ArrowRight" => Some(true),
        "ArrowLeft" => Some(false),
        _ => None,
    }
}

pub struct SessionController {
    config: SwipeConfig,
    generation: u64,
    phase: Phase,
    stage: CardStage,
    deck: Deck,
    tracker: GestureTracker,
    status: StatusLine,
    busy: bool,
    visible: Option<VisibleCard>,
    pose: CardPose,
    affordance: Affordance,
    summary: Option<Summary>,
}

impl SessionController {
    pub fn new(config: SwipeConfig) -> Self {
        let tracker = GestureTracker::new(config.gesture());
        Self {
            config,
            generation: 0,
            phase: Phase::Loading,
            stage: CardStage::AwaitingImage,
            deck: Deck::default(),
            tracker,
            status: StatusLine::Loading,
            busy: false,
            visible: None,
            pose: CardPose::Rest,
            affordance: Affordance::Neutral,
            summary: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            status: self.status,
            busy: self.busy,
            visible: self.visible.clone(),
            pose: self.pose,
            affordance: self.affordance,
            input_enabled: self.accepts_input(),
            summary: self.summary.clone(),
        }
    }

    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        let mut effects = Vec::new();
        match action {
            Action::Start => self.initialize(&mut effects),
            Action::BatchFetched { generation, items } => {
                if generation != self.generation || self.phase != Phase::Loading {
                    debug!("Discarding batch from stale generation {}", generation);
                } else {
                    self.install_batch(items, &mut effects);
                }
            }
            Action::ImageSettled {
                generation,
                cursor,
                loaded,
            } => {
                if !self.is_pending_load(generation, cursor) {
                    debug!(
                        "Discarding image result for generation {} cursor {}",
                        generation, cursor
                    );
                } else if loaded {
                    self.show_loaded();
                } else {
                    self.skip_broken(&mut effects);
                }
            }
            Action::Choose { liked } => {
                if self.accepts_input() {
                    self.begin_commit(liked, &mut effects);
                }
            }
            Action::Pointer { source, input } => self.pointer(source, input, &mut effects),
            Action::CommitElapsed { generation, cursor } => {
                match self.stage {
                    CardStage::AnimatingCommit { liked }
                        if generation == self.generation
                            && cursor == self.deck.cursor()
                            && self.phase == Phase::Presenting =>
                    {
                        self.commit(liked, &mut effects);
                    }
                    _ => debug!(
                        "Discarding commit for generation {} cursor {}",
                        generation, cursor
                    ),
                }
            }
        }
        effects
    }

    fn accepts_input(&self) -> bool {
        self.phase == Phase::Presenting && self.stage == CardStage::Ready
    }

    fn is_pending_load(&self, generation: u64, cursor: usize) -> bool {
        generation == self.generation
            && self.phase == Phase::Presenting
            && self.stage == CardStage::AwaitingImage
            && cursor == self.deck.cursor()
    }

    fn initialize(&mut self, effects: &mut Vec<Effect>) {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.stage = CardStage::AwaitingImage;
        self.deck = Deck::default();
        self.tracker.reset();
        self.status = StatusLine::Loading;
        self.busy = false;
        self.visible = None;
        self.summary = None;
        self.clear_feedback();

        info!(
            "Starting session {} with a batch of {}",
            self.generation, self.config.batch_size
        );
        effects.push(Effect::FetchBatch {
            generation: self.generation,
            count: self.config.batch_size,
        });
    }

    fn install_batch(&mut self, items: Vec<ImageRef>, effects: &mut Vec<Effect>) {
        if items.is_empty() {
            error!("No images could be fetched for session {}", self.generation);
            self.status = StatusLine::FetchFailed;
            return;
        }

        if items.len() < self.config.batch_size {
            warn!(
                "Only {} of {} images fetched",
                items.len(),
                self.config.batch_size
            );
        }

        effects.push(Effect::Preload(items.clone()));
        self.deck = Deck::new(items);
        self.phase = Phase::Presenting;
        self.display_current(effects);
    }

    fn display_current(&mut self, effects: &mut Vec<Effect>) {
        let Some(reference) = self.deck.current().cloned() else {
            self.show_summary();
            return;
        };

        self.stage = CardStage::AwaitingImage;
        self.busy = true;
        effects.push(Effect::LoadImage {
            generation: self.generation,
            cursor: self.deck.cursor(),
            reference,
        });
    }

    fn show_loaded(&mut self) {
        self.busy = false;
        self.stage = CardStage::Ready;
        if let (Some(reference), Some((position, total))) =
            (self.deck.current().cloned(), self.deck.progress())
        {
            self.visible = Some(VisibleCard {
                reference,
                position,
            });
            self.status = StatusLine::Progress { position, total };
        }
    }

    fn skip_broken(&mut self, effects: &mut Vec<Effect>) {
        if let Some(reference) = self.deck.current() {
            warn!("Skipping image that failed to load: {}", reference);
        }
        self.busy = false;
        self.status = StatusLine::SkippedBroken;
        self.deck.skip();
        self.display_current(effects);
    }

    fn pointer(&mut self, source: PointerSource, input: PointerInput, effects: &mut Vec<Effect>) {
        if !self.accepts_input() {
            // Drags already in flight still need to end cleanly.
            if !matches!(input, PointerInput::Start(_) | PointerInput::Move(_)) {
                self.tracker.handle(source, input);
            }
            return;
        }

        match self.tracker.handle(source, input) {
            GestureOutcome::Ignored => {}
            GestureOutcome::Tracking {
                translate_x,
                rotate_deg,
                affordance,
                suppress_default,
            } => {
                self.pose = CardPose::Dragging {
                    translate_x,
                    rotate_deg,
                };
                self.affordance = affordance;
                if suppress_default {
                    effects.push(Effect::SuppressDefault);
                }
            }
            GestureOutcome::Commit { liked } => self.begin_commit(liked, effects),
            GestureOutcome::Cancel => {
                self.pose = CardPose::Returning;
                self.affordance = Affordance::Neutral;
            }
        }
    }

    fn begin_commit(&mut self, liked: bool, effects: &mut Vec<Effect>) {
        self.tracker.reset();
        self.stage = CardStage::AnimatingCommit { liked };
        self.pose = CardPose::Flung { liked };
        self.affordance = Affordance::for_choice(liked);

        let cursor = self.deck.cursor();
        if self.config.animation_ms == 0 {
            self.commit(liked, effects);
        } else {
            effects.push(Effect::ScheduleCommit {
                generation: self.generation,
                cursor,
                delay_ms: self.config.animation_ms,
            });
        }
    }

    fn commit(&mut self, liked: bool, effects: &mut Vec<Effect>) {
        self.deck.decide(liked);
        self.clear_feedback();
        self.display_current(effects);
    }

    fn clear_feedback(&mut self) {
        self.pose = CardPose::Rest;
        self.affordance = Affordance::Neutral;
    }

    fn show_summary(&mut self) {
        let summary = self.deck.summary();
        info!(
            "Session {} finished: liked {} of {}",
            self.generation,
            summary.liked_count(),
            summary.total
        );
        self.busy = false;
        self.visible = None;
        self.tracker.reset();
        self.summary = Some(summary);
        self.phase = Phase::Summary;
    }
}
