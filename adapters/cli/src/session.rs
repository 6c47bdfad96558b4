//! Headless game loop wiring the world, the systems and a recording presenter.

use std::time::Duration;

use gate_puzzle_core::{Command, Directive, Event, LevelState};
use gate_puzzle_presentation::{PresenterCall, RecordingPresenter, Signals, Stage};
use gate_puzzle_system_extraction::{Extraction, ExtractionConfig};
use gate_puzzle_system_gate_matcher::GateMatcher;
use gate_puzzle_world::{self as world, query, World};

pub(crate) struct Session {
    world: World,
    matcher: GateMatcher,
    extraction: Extraction,
    stage: Stage,
    presenter: RecordingPresenter,
    signals: Signals,
}

impl Session {
    pub(crate) fn new(config: ExtractionConfig) -> Self {
        Self {
            world: World::new(),
            matcher: GateMatcher::new(),
            extraction: Extraction::new(config),
            stage: Stage::new(),
            presenter: RecordingPresenter::new(),
            signals: Signals::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn signals_mut(&mut self) -> &mut Signals {
        &mut self.signals
    }

    /// Presenter calls recorded since the last drain.
    pub(crate) fn drain_calls(&mut self) -> Vec<PresenterCall> {
        self.presenter.drain()
    }

    /// Applies a command and every command the systems derive from it.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            self.signals.notify(&events);
            self.matcher.handle(
                &events,
                query::level_state(&self.world),
                &query::block_view(&self.world),
                &query::gate_view(&self.world),
                query::occupancy_view(&self.world),
                &mut pending,
            );
            let mut directives: Vec<Directive> = Vec::new();
            self.extraction.handle(
                &events,
                &query::layout(&self.world),
                &mut pending,
                &mut directives,
            );
            self.stage.dispatch_all(&directives, &mut self.presenter);
            log.extend(events);
        }
        log
    }

    pub(crate) fn start(&mut self) -> Vec<Event> {
        self.submit(Command::SetLevelState {
            state: LevelState::InProgress,
        })
    }

    /// Advances time in fixed frames until no extraction is in flight.
    ///
    /// Returns the events produced and the number of frames simulated.
    pub(crate) fn settle(&mut self, frame: Duration, max_frames: u32) -> (Vec<Event>, u32) {
        let mut log = Vec::new();
        let mut frames = 0;
        while !self.extraction.is_idle() && frames < max_frames {
            log.extend(self.submit(Command::Tick { dt: frame }));
            frames += 1;
        }
        (log, frames)
    }
}
