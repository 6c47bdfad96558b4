#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation collaborators driven by extraction directives and world events.
//!
//! Rendering, audio and haptics live outside the engine. Adapters implement the
//! collaborator traits below and feed every [`Directive`] through
//! [`Stage::dispatch`]. Payload-free notifications are delivered through
//! [`Signal`] subscriber lists.

mod signal;

use std::{collections::BTreeSet, time::Duration};

use gate_puzzle_core::{BlockId, Direction, Directive, EffectHandle, Easing, GateId};
use glam::{Quat, Vec3};
use log::trace;

pub use signal::{Signal, Signals, SubscriptionId};

/// Animates gate representations.
pub trait GateActuator {
    /// Lowers the gate so a block can pass.
    fn move_down(&mut self, gate: GateId);

    /// Raises the gate back to its resting position.
    fn move_up(&mut self, gate: GateId);
}

/// Animates block representations.
pub trait BlockAnimator {
    /// Moves the block between two world positions.
    fn translate_to(
        &mut self,
        block: BlockId,
        from: Vec3,
        to: Vec3,
        duration: Duration,
        easing: Easing,
    );

    /// Tells the block material where its dissolve starts.
    fn dissolve_hint(&mut self, block: BlockId, direction: Direction, origin: Vec3);

    /// Destroys the block representation.
    fn dispose(&mut self, block: BlockId);
}

/// Spawns fire-and-forget visual effects.
pub trait EffectSpawner {
    /// Spawns an effect that destroys itself after `lifetime`.
    fn spawn_effect(&mut self, effect: EffectHandle, position: Vec3, rotation: Quat, lifetime: Duration);
}

/// Audio and haptic feedback.
pub trait FeedbackCues {
    /// Plays the block removal sound.
    fn play_remove_cue(&mut self);

    /// Plays the success haptic.
    fn play_success_haptic(&mut self);
}

/// Every collaborator a stage needs to play directives.
pub trait Presenter: GateActuator + BlockAnimator + EffectSpawner + FeedbackCues {}

impl<T> Presenter for T where T: GateActuator + BlockAnimator + EffectSpawner + FeedbackCues {}

/// Routes directives to a presenter, keeping gate animations idempotent.
///
/// A gate that is already down ignores further retract requests and a gate
/// that is up ignores restore requests.
#[derive(Debug, Default)]
pub struct Stage {
    lowered: BTreeSet<GateId>,
}

impl Stage {
    /// Creates a stage with every gate raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the gate is currently lowered.
    #[must_use]
    pub fn is_lowered(&self, gate: GateId) -> bool {
        self.lowered.contains(&gate)
    }

    /// Plays a single directive.
    pub fn dispatch<P>(&mut self, directive: &Directive, presenter: &mut P)
    where
        P: Presenter + ?Sized,
    {
        match directive {
            Directive::RetractGate { gate } => {
                if self.lowered.insert(*gate) {
                    presenter.move_down(*gate);
                } else {
                    trace!("gate {} already lowered", gate.get());
                }
            }
            Directive::RestoreGate { gate } => {
                if self.lowered.remove(gate) {
                    presenter.move_up(*gate);
                } else {
                    trace!("gate {} already raised", gate.get());
                }
            }
            Directive::SpawnEffect {
                effect,
                position,
                rotation,
                lifetime,
            } => presenter.spawn_effect(*effect, *position, *rotation, *lifetime),
            Directive::PlayRemoveCue => presenter.play_remove_cue(),
            Directive::DissolveHint {
                block,
                direction,
                origin,
            } => presenter.dissolve_hint(*block, *direction, *origin),
            Directive::TranslateBlock {
                block,
                from,
                to,
                duration,
                easing,
            } => presenter.translate_to(*block, *from, *to, *duration, *easing),
            Directive::DisposeBlock { block } => presenter.dispose(*block),
            Directive::PlaySuccessHaptic => presenter.play_success_haptic(),
        }
    }

    /// Plays directives in order.
    pub fn dispatch_all<P>(&mut self, directives: &[Directive], presenter: &mut P)
    where
        P: Presenter + ?Sized,
    {
        for directive in directives {
            self.dispatch(directive, presenter);
        }
    }
}

/// Position of an eased motion after `elapsed` time.
///
/// Zero-length motions jump straight to `to`.
#[must_use]
pub fn tween_position(from: Vec3, to: Vec3, duration: Duration, easing: Easing, elapsed: Duration) -> Vec3 {
    if duration.is_zero() {
        return to;
    }
    let t = elapsed.as_secs_f32() / duration.as_secs_f32();
    from.lerp(to, easing.sample(t))
}

/// Collaborator call captured by [`RecordingPresenter`].
#[derive(Clone, Debug, PartialEq)]
pub enum PresenterCall {
    /// `GateActuator::move_down`.
    MoveDown(GateId),
    /// `GateActuator::move_up`.
    MoveUp(GateId),
    /// `BlockAnimator::translate_to`.
    Translate {
        /// Block being moved.
        block: BlockId,
        /// Final world position.
        to: Vec3,
        /// Duration of the motion.
        duration: Duration,
    },
    /// `BlockAnimator::dissolve_hint`.
    Dissolve {
        /// Block being dissolved.
        block: BlockId,
        /// Pull direction of the gate.
        direction: Direction,
    },
    /// `BlockAnimator::dispose`.
    Dispose(BlockId),
    /// `EffectSpawner::spawn_effect`.
    Effect {
        /// Prefab handle.
        effect: EffectHandle,
        /// World-space position.
        position: Vec3,
    },
    /// `FeedbackCues::play_remove_cue`.
    RemoveCue,
    /// `FeedbackCues::play_success_haptic`.
    SuccessHaptic,
}

/// Presenter that records every call, for headless runs.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Vec<PresenterCall>,
}

impl RecordingPresenter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> &[PresenterCall] {
        &self.calls
    }

    /// Removes and returns the recorded calls.
    pub fn drain(&mut self) -> Vec<PresenterCall> {
        std::mem::take(&mut self.calls)
    }
}

impl GateActuator for RecordingPresenter {
    fn move_down(&mut self, gate: GateId) {
        self.calls.push(PresenterCall::MoveDown(gate));
    }

    fn move_up(&mut self, gate: GateId) {
        self.calls.push(PresenterCall::MoveUp(gate));
    }
}

impl BlockAnimator for RecordingPresenter {
    fn translate_to(
        &mut self,
        block: BlockId,
        _from: Vec3,
        to: Vec3,
        duration: Duration,
        _easing: Easing,
    ) {
        self.calls.push(PresenterCall::Translate {
            block,
            to,
            duration,
        });
    }

    fn dissolve_hint(&mut self, block: BlockId, direction: Direction, _origin: Vec3) {
        self.calls.push(PresenterCall::Dissolve { block, direction });
    }

    fn dispose(&mut self, block: BlockId) {
        self.calls.push(PresenterCall::Dispose(block));
    }
}

impl EffectSpawner for RecordingPresenter {
    fn spawn_effect(&mut self, effect: EffectHandle, position: Vec3, _rotation: Quat, _lifetime: Duration) {
        self.calls.push(PresenterCall::Effect { effect, position });
    }
}

impl FeedbackCues for RecordingPresenter {
    fn play_remove_cue(&mut self) {
        self.calls.push(PresenterCall::RemoveCue);
    }

    fn play_success_haptic(&mut self) {
        self.calls.push(PresenterCall::SuccessHaptic);
    }
}
