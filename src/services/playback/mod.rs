// Playback synchronization module
// Maps the current playback position onto the loaded cue sequence

use log::debug;

use crate::models::Cue;

/// Player notifications that force a synchronous re-evaluation of the active
/// cue. No polling timer exists; these events are the only drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    TimeUpdate,
    Seeked,
    Play,
    Pause,
    MetadataLoaded,
}

/// Handle onto a live player element.
pub trait PlayerHandle {
    /// Whether the element is still part of the live page.
    fn is_attached(&self) -> bool;
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
}

/// Locates a player element on the page, used for the initial binding and
/// for rebinding after host-page navigation detaches the old element.
pub trait PlayerLocator {
    type Handle: PlayerHandle;
    fn locate(&self) -> Option<Self::Handle>;
}

/// Derived state of the subtitle display surface. Recomputed on every player
/// event, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Visible(String),
    Hidden,
}

/// Returns the first cue in sequence order whose window covers
/// `current_time`.
///
/// Overlapping cues are resolved by list position, not by start time, so the
/// result is deterministic even for input that is not sorted by time.
pub fn active_cue(current_time: f64, cues: &[Cue]) -> Option<&Cue> {
    cues.iter().find(|cue| cue.contains(current_time))
}

/// Owns the loaded cue sequence and the player binding for one subtitle
/// track.
pub struct Synchronizer<L: PlayerLocator> {
    locator: L,
    player: Option<L::Handle>,
    cues: Vec<Cue>,
}

impl<L: PlayerLocator> Synchronizer<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            player: None,
            cues: Vec::new(),
        }
    }

    /// Replaces the loaded subtitle track.
    pub fn load_cues(&mut self, cues: Vec<Cue>) {
        debug!("Loaded subtitle track with {} cues", cues.len());
        self.cues = cues;
    }

    /// Drops the loaded track, e.g. when the tracked video changes or goes
    /// away.
    pub fn clear(&mut self) {
        self.cues.clear();
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Re-evaluates the active cue in response to a player event. All events
    /// trigger the same evaluation; the variants exist so callers wire every
    /// relevant player notification through here.
    pub fn handle_event(&mut self, _event: PlayerEvent) -> DisplayState {
        self.evaluate()
    }

    /// Computes the current display state, rebinding to a freshly located
    /// player first if the previous one went away.
    pub fn evaluate(&mut self) -> DisplayState {
        if !self.ensure_player() {
            return DisplayState::Hidden;
        }
        let Some(player) = self.player.as_ref() else {
            return DisplayState::Hidden;
        };
        if self.cues.is_empty() {
            return DisplayState::Hidden;
        }

        match active_cue(player.current_time(), &self.cues) {
            Some(cue) => DisplayState::Visible(cue.text.clone()),
            None => DisplayState::Hidden,
        }
    }

    fn ensure_player(&mut self) -> bool {
        let attached = self
            .player
            .as_ref()
            .map(|player| player.is_attached())
            .unwrap_or(false);
        if !attached {
            debug!("Player detached or unbound, attempting to rebind");
            self.player = self
                .locator
                .locate()
                .filter(|player| player.is_attached());
        }
        self.player.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Clone)]
    struct FakePlayer {
        attached: bool,
        time: f64,
    }

    impl PlayerHandle for FakePlayer {
        fn is_attached(&self) -> bool {
            self.attached
        }

        fn current_time(&self) -> f64 {
            self.time
        }
    }

    /// Hands out pre-arranged players, one per locate call.
    struct FakeLocator {
        players: RefCell<Vec<FakePlayer>>,
    }

    impl FakeLocator {
        fn with(players: Vec<FakePlayer>) -> Self {
            Self {
                players: RefCell::new(players),
            }
        }

        fn empty() -> Self {
            Self::with(Vec::new())
        }
    }

    impl PlayerLocator for FakeLocator {
        type Handle = FakePlayer;

        fn locate(&self) -> Option<FakePlayer> {
            let mut players = self.players.borrow_mut();
            if players.is_empty() {
                None
            } else {
                Some(players.remove(0))
            }
        }
    }

    fn cue(start: f64, end: f64, text: &str) -> Cue {
        Cue::new(start, end, text.to_string())
    }

    #[test]
    fn test_overlapping_cues_first_listed_wins() {
        let cues = vec![cue(0.0, 5.0, "first"), cue(2.0, 8.0, "second")];
        let active = active_cue(3.0, &cues).unwrap();
        assert_eq!(active.text, "first");
    }

    #[test]
    fn test_no_match_outside_all_windows() {
        let cues = vec![cue(0.0, 5.0, "first"), cue(2.0, 8.0, "second")];
        assert!(active_cue(9.0, &cues).is_none());
    }

    #[test]
    fn test_empty_cue_list_always_hidden() {
        let locator = FakeLocator::with(vec![FakePlayer {
            attached: true,
            time: 3.0,
        }]);
        let mut sync = Synchronizer::new(locator);
        assert_eq!(sync.handle_event(PlayerEvent::TimeUpdate), DisplayState::Hidden);
        assert_eq!(sync.handle_event(PlayerEvent::Seeked), DisplayState::Hidden);
    }

    #[test]
    fn test_visible_when_cue_covers_current_time() {
        let locator = FakeLocator::with(vec![FakePlayer {
            attached: true,
            time: 1.5,
        }]);
        let mut sync = Synchronizer::new(locator);
        sync.load_cues(vec![cue(1.0, 2.0, "hello\nworld")]);
        assert_eq!(
            sync.handle_event(PlayerEvent::TimeUpdate),
            DisplayState::Visible("hello\nworld".to_string())
        );
    }

    #[test]
    fn test_hidden_when_no_player_found() {
        let mut sync = Synchronizer::new(FakeLocator::empty());
        sync.load_cues(vec![cue(0.0, 10.0, "text")]);
        assert_eq!(sync.handle_event(PlayerEvent::TimeUpdate), DisplayState::Hidden);
    }

    #[test]
    fn test_detached_player_triggers_rebind() {
        // The locator first hands out a detached element, then a live
        // replacement at a different position.
        let locator = FakeLocator::with(vec![
            FakePlayer {
                attached: false,
                time: 0.0,
            },
            FakePlayer {
                attached: true,
                time: 4.0,
            },
        ]);
        let mut sync = Synchronizer::new(locator);
        sync.load_cues(vec![cue(3.0, 5.0, "after rebind")]);

        // The detached element is rejected, so the first evaluation stays
        // hidden; the next rebind picks up the live replacement.
        assert_eq!(
            sync.handle_event(PlayerEvent::TimeUpdate),
            DisplayState::Hidden
        );
        assert_eq!(
            sync.handle_event(PlayerEvent::TimeUpdate),
            DisplayState::Visible("after rebind".to_string())
        );
    }

    #[test]
    fn test_rebind_rejects_already_detached_element() {
        // The only element the locator can find is already detached. Even
        // though its reported position falls inside a cue window, it must
        // not be bound and the state stays hidden.
        let locator = FakeLocator::with(vec![FakePlayer {
            attached: false,
            time: 1.0,
        }]);
        let mut sync = Synchronizer::new(locator);
        sync.load_cues(vec![cue(0.0, 5.0, "never shown")]);
        assert_eq!(
            sync.handle_event(PlayerEvent::TimeUpdate),
            DisplayState::Hidden
        );
    }

    #[test]
    fn test_clear_resets_track() {
        let locator = FakeLocator::with(vec![FakePlayer {
            attached: true,
            time: 1.0,
        }]);
        let mut sync = Synchronizer::new(locator);
        sync.load_cues(vec![cue(0.0, 2.0, "text")]);
        assert_eq!(
            sync.handle_event(PlayerEvent::Play),
            DisplayState::Visible("text".to_string())
        );
        sync.clear();
        assert_eq!(sync.handle_event(PlayerEvent::Pause), DisplayState::Hidden);
    }
}
