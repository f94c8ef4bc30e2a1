//! Debounce policy for outgoing commands.
//!
//! A command goes out when it differs from the last one sent, or when the same command has
//! been quiet for longer than its cooldown. Movement commands repeat faster than the rest.

use std::time::{Duration, Instant};

use crate::command::CommandName;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(750);
pub const DEFAULT_MOVEMENT_COOLDOWN: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Repeat window for GRAB, RELEASE and STOP.
    pub cooldown: Duration,
    /// Repeat window for the six movement commands.
    pub movement_cooldown: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            movement_cooldown: DEFAULT_MOVEMENT_COOLDOWN,
        }
    }
}

impl DispatchPolicy {
    pub fn cooldown_for(&self, command: CommandName) -> Duration {
        if command.is_movement() {
            self.movement_cooldown
        } else {
            self.cooldown
        }
    }

    pub fn should_dispatch(
        &self,
        command: CommandName,
        now: Instant,
        state: &DispatchState,
    ) -> bool {
        match state.last {
            Some((last, at)) if last == command => {
                now.saturating_duration_since(at) > self.cooldown_for(command)
            }
            _ => true,
        }
    }
}

/// Last command sent and when. Untouched by frames that produce no command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchState {
    last: Option<(CommandName, Instant)>,
}

impl DispatchState {
    pub fn last_command(&self) -> Option<CommandName> {
        self.last.map(|(command, _)| command)
    }

    pub fn last_dispatch_at(&self) -> Option<Instant> {
        self.last.map(|(_, at)| at)
    }

    pub fn record(&mut self, command: CommandName, now: Instant) {
        self.last = Some((command, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    /// Offers a command and records it when the policy lets it through.
    fn offer(
        policy: &DispatchPolicy,
        state: &mut DispatchState,
        cmd: CommandName,
        now: Instant,
    ) -> bool {
        let send = policy.should_dispatch(cmd, now, state);
        if send {
            state.record(cmd, now);
        }
        send
    }

    #[test]
    fn movement_repeats_after_short_cooldown() {
        let policy = DispatchPolicy::default();
        let mut state = DispatchState::default();
        let t0 = Instant::now();
        assert!(offer(&policy, &mut state, CommandName::Left, t0));
        assert!(!offer(&policy, &mut state, CommandName::Left, ms(t0, 200)));
        assert!(offer(&policy, &mut state, CommandName::Left, ms(t0, 310)));
        assert_eq!(state.last_dispatch_at(), Some(ms(t0, 310)));
    }

    #[test]
    fn cooldown_boundary_is_exclusive() {
        let policy = DispatchPolicy::default();
        let mut state = DispatchState::default();
        let t0 = Instant::now();
        assert!(offer(&policy, &mut state, CommandName::Stop, t0));
        assert!(!offer(&policy, &mut state, CommandName::Stop, ms(t0, 750)));
        assert!(!offer(&policy, &mut state, CommandName::Stop, ms(t0, 500)));
        assert!(offer(&policy, &mut state, CommandName::Stop, ms(t0, 751)));
    }

    #[test]
    fn changed_command_overrides_cooldown() {
        let policy = DispatchPolicy::default();
        let mut state = DispatchState::default();
        let t0 = Instant::now();
        assert!(offer(&policy, &mut state, CommandName::Left, t0));
        assert!(offer(&policy, &mut state, CommandName::Stop, ms(t0, 10)));
        assert_eq!(state.last_command(), Some(CommandName::Stop));
    }

    #[test]
    fn first_command_always_dispatches() {
        let policy = DispatchPolicy::default();
        let state = DispatchState::default();
        assert!(policy.should_dispatch(CommandName::Grab, Instant::now(), &state));
    }

    #[test]
    fn cooldown_depends_on_command_kind() {
        let policy = DispatchPolicy::default();
        assert_eq!(policy.cooldown_for(CommandName::Forward), DEFAULT_MOVEMENT_COOLDOWN);
        assert_eq!(policy.cooldown_for(CommandName::Release), DEFAULT_COOLDOWN);
    }
}
