//! Navigation through a game tree and timed autoplay.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use crate::controlled::Controlled;

/// Delay between two autoplay steps.
pub const PLAY_INTERVAL: Duration = Duration::from_secs(1);

/// The tree structure navigation needs, addressed by node id.
pub trait GameTree {
    fn has_node(&self, id: &str) -> bool;

    /// Node before `id` in its variation; for the first move, the variation
    /// start. `None` at a variation start.
    fn previous_in_variation(&self, id: &str) -> Option<String>;

    fn next_in_variation(&self, id: &str) -> Option<String>;

    /// Start of the variation containing `id`.
    fn variation_start(&self, id: &str) -> Option<String>;

    /// For a variation start, the node preceding the variation's anchor in
    /// the parent line. `None` for the main line and for move nodes.
    fn variation_parent(&self, id: &str) -> Option<String>;
}

pub fn first_node_id(tree: &impl GameTree, id: &str) -> Option<String> {
    tree.variation_start(id).filter(|start| start != id)
}

pub fn previous_node_id(tree: &impl GameTree, id: &str) -> Option<String> {
    if !tree.has_node(id) {
        return None;
    }
    tree.previous_in_variation(id).or_else(|| tree.variation_parent(id))
}

pub fn next_node_id(tree: &impl GameTree, id: &str) -> Option<String> {
    tree.next_in_variation(id)
}

pub fn last_node_id(tree: &impl GameTree, id: &str) -> Option<String> {
    let mut last = tree.next_in_variation(id)?;
    while let Some(next) = tree.next_in_variation(&last) {
        last = next;
    }
    Some(last)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    First,
    Previous,
    Next,
    Last,
    TogglePlay,
    Flip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Home,
    Left,
    Right,
    End,
}

impl NavKey {
    pub fn action(self) -> NavAction {
        match self {
            NavKey::Home => NavAction::First,
            NavKey::Left => NavAction::Previous,
            NavKey::Right => NavAction::Next,
            NavKey::End => NavAction::Last,
        }
    }
}

/// Change the host should be told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    NodeIdChanged(String),
    FlippedChanged(bool),
    IsPlayingChanged(bool),
}

/// A single autoplay deadline. Every reschedule or cancel bumps the
/// generation, so a tick carrying an older generation is stale.
#[derive(Debug)]
pub struct AutoplayTimer {
    interval: Duration,
    generation: u64,
    deadline: Option<Instant>,
}

impl AutoplayTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            deadline: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.deadline = Some(now + self.interval);
        self.generation
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            trace!(generation = self.generation, "autoplay tick cancelled");
        }
        self.generation += 1;
    }

    /// Generation of the tick due at `now`, consuming it.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(self.generation)
            }
            _ => None,
        }
    }

    /// Sleeps until the deadline and returns its generation; `None` right
    /// away when nothing is scheduled.
    pub async fn wait(&self) -> Option<u64> {
        let deadline = self.deadline?;
        let generation = self.generation;
        sleep_until(deadline).await;
        Some(generation)
    }
}

impl Default for AutoplayTimer {
    fn default() -> Self {
        Self::new(PLAY_INTERVAL)
    }
}

/// Current node, playing flag and orientation of a navigation board.
///
/// The timer is owned, so dropping the controller drops any pending tick.
#[derive(Debug)]
pub struct NavigationController {
    node_id: Controlled<String>,
    playing: Controlled<bool>,
    flipped: Controlled<bool>,
    timer: AutoplayTimer,
}

impl NavigationController {
    pub fn new(node_id: Controlled<String>, playing: Controlled<bool>, flipped: Controlled<bool>) -> Self {
        Self {
            node_id,
            playing,
            flipped,
            timer: AutoplayTimer::default(),
        }
    }

    /// Starts the timer if the initial state asks for autoplay.
    pub fn start(&mut self, tree: &impl GameTree, now: Instant) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        self.reschedule(tree, now, &mut events);
        events
    }

    pub fn node_id(&self) -> &str {
        self.node_id.get()
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.get()
    }

    pub fn is_flipped(&self) -> bool {
        *self.flipped.get()
    }

    pub fn timer(&self) -> &AutoplayTimer {
        &self.timer
    }

    pub fn handle(&mut self, tree: &impl GameTree, action: NavAction, now: Instant) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        let current = self.node_id().to_string();
        let target = match action {
            NavAction::First => first_node_id(tree, &current),
            NavAction::Previous => previous_node_id(tree, &current),
            NavAction::Next => next_node_id(tree, &current),
            NavAction::Last => last_node_id(tree, &current),
            NavAction::Flip => {
                let flipped = !self.is_flipped();
                if let Some(flipped) = self.flipped.request(flipped) {
                    events.push(NavigationEvent::FlippedChanged(flipped));
                }
                return events;
            }
            NavAction::TogglePlay => {
                let enable = !self.is_playing();
                if enable && next_node_id(tree, &current).is_none() {
                    trace!(node = %current, "nothing to play");
                    return events;
                }
                self.request_playing(enable, &mut events);
                self.reschedule(tree, now, &mut events);
                return events;
            }
        };

        // User navigation always stops autoplay.
        self.request_playing(false, &mut events);
        if let Some(target) = target {
            self.request_node(target, &mut events);
        }
        self.reschedule(tree, now, &mut events);
        events
    }

    pub fn handle_key(&mut self, tree: &impl GameTree, key: NavKey, now: Instant) -> Vec<NavigationEvent> {
        self.handle(tree, key.action(), now)
    }

    /// Jumps to `node_id`, like any other user navigation.
    pub fn go_to(&mut self, tree: &impl GameTree, node_id: String, now: Instant) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        if !tree.has_node(&node_id) {
            return events;
        }
        self.request_playing(false, &mut events);
        self.request_node(node_id, &mut events);
        self.reschedule(tree, now, &mut events);
        events
    }

    /// Values pushed by the host. Any change restarts the timer.
    pub fn sync(
        &mut self,
        tree: &impl GameTree,
        node_id: Option<String>,
        playing: Option<bool>,
        flipped: Option<bool>,
        now: Instant,
    ) -> Vec<NavigationEvent> {
        let mut changed = false;
        if let Some(node_id) = node_id {
            changed |= self.node_id.sync(node_id);
        }
        if let Some(playing) = playing {
            changed |= self.playing.sync(playing);
        }
        if let Some(flipped) = flipped {
            self.flipped.sync(flipped);
        }
        let mut events = Vec::new();
        if changed {
            self.reschedule(tree, now, &mut events);
        }
        events
    }

    /// Fires the tick due at `now`, if any.
    pub fn poll(&mut self, tree: &impl GameTree, now: Instant) -> Vec<NavigationEvent> {
        match self.timer.poll(now) {
            Some(generation) => self.tick(tree, generation, now),
            None => Vec::new(),
        }
    }

    /// Advances one node for the tick of `generation`; stale ticks are ignored.
    pub fn tick(&mut self, tree: &impl GameTree, generation: u64, now: Instant) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        if generation != self.timer.generation() || !self.is_playing() {
            trace!(generation, current = self.timer.generation(), "stale autoplay tick");
            return events;
        }
        self.timer.cancel();
        let Some(next) = next_node_id(tree, self.node_id()) else {
            self.request_playing(false, &mut events);
            return events;
        };
        debug!(node = %next, "autoplay advance");
        let at_end = next_node_id(tree, &next).is_none();
        self.request_node(next, &mut events);
        if at_end {
            self.request_playing(false, &mut events);
        }
        self.reschedule(tree, now, &mut events);
        events
    }

    fn request_node(&mut self, node_id: String, events: &mut Vec<NavigationEvent>) {
        if let Some(node_id) = self.node_id.request(node_id) {
            events.push(NavigationEvent::NodeIdChanged(node_id));
        }
    }

    fn request_playing(&mut self, playing: bool, events: &mut Vec<NavigationEvent>) {
        if let Some(playing) = self.playing.request(playing) {
            events.push(NavigationEvent::IsPlayingChanged(playing));
        }
    }

    /// Replaces the pending tick after a state change. Delegated state waits
    /// for the host to push the new values before scheduling again.
    fn reschedule(&mut self, tree: &impl GameTree, now: Instant, events: &mut Vec<NavigationEvent>) {
        self.timer.cancel();
        if !self.is_playing() {
            return;
        }
        let pending = events.iter().any(|e| match e {
            NavigationEvent::NodeIdChanged(id) => id != self.node_id(),
            NavigationEvent::IsPlayingChanged(playing) => *playing != self.is_playing(),
            NavigationEvent::FlippedChanged(_) => false,
        });
        if pending {
            return;
        }
        if next_node_id(tree, self.node_id()).is_none() {
            self.request_playing(false, events);
            return;
        }
        self.timer.schedule(now);
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod navigation_tests;
