//! Foreground tick loop.
//!
//! Drives [`FocusSession::tick`] on a `tokio` interval and applies host
//! controls from a channel. Tick cadence is best effort: a late or skipped
//! tick only delays rendering, since progress comes from wall-clock deltas.
//!
//! The loop ends on [`Control::Shutdown`] or when every sender is dropped,
//! and always finishes with [`FocusSession::shutdown`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::events::Event;
use crate::session::FocusSession;

/// Requests a host can send to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start(usize),
    /// Stop the given slot, or whichever slot is running.
    Stop(Option<usize>),
    Reset,
    /// The host is being backgrounded or hidden.
    Hidden,
    /// The host is visible again.
    Visible,
    /// Ask the observer to render without changing anything.
    Refresh,
    Shutdown,
}

/// What the observer is told about.
#[derive(Debug, Clone, Copy)]
pub enum Update<'a> {
    /// A periodic tick ran; carries the completion event if one happened.
    Tick(Option<&'a Event>),
    /// A control was applied; carries its event if it was accepted.
    Control(Control, Option<&'a Event>),
}

/// Run the session until shutdown.
///
/// `observe` is called after every tick and after every control, with the
/// session in its post-update state.
pub async fn run_session<F>(
    session: &mut FocusSession,
    period: Duration,
    mut controls: mpsc::UnboundedReceiver<Control>,
    mut observe: F,
) where
    F: FnMut(&FocusSession, Update<'_>),
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(?period, "tick loop started");

    loop {
        tokio::select! {
            biased;
            control = controls.recv() => {
                let Some(control) = control else { break };
                if control == Control::Shutdown {
                    break;
                }
                let event = apply(session, control);
                observe(session, Update::Control(control, event.as_ref()));
            }
            _ = ticker.tick() => {
                let event = session.tick();
                observe(session, Update::Tick(event.as_ref()));
            }
        }
    }

    session.shutdown();
    debug!("tick loop stopped");
}

fn apply(session: &mut FocusSession, control: Control) -> Option<Event> {
    match control {
        Control::Start(index) => session.start(index),
        Control::Stop(Some(index)) => session.stop(index),
        Control::Stop(None) => session.stop_running(),
        Control::Reset => Some(session.reset()),
        Control::Hidden => {
            session.on_hidden();
            None
        }
        Control::Visible => session.on_visible(),
        Control::Refresh | Control::Shutdown => None,
    }
}
